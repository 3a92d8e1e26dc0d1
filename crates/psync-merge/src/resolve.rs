//! Per-field resolution strategies.
//!
//! Resolvers take the provenance list and the record table explicitly and
//! never mutate input records.

use psync_schemas::{Category, SourceRecord};

use crate::provenance::RecordTable;

// ---------------------------------------------------------------------------
// Preference tokens
// ---------------------------------------------------------------------------

/// Token literal meaning "any source, in provenance order".
pub const ANY_SOURCE_TOKEN: &str = "source";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceToken {
    /// First non-blank value across the sku's provenance.
    AnySource,
    /// This source's value if it carries the sku, blank or not.
    Source(String),
}

impl PreferenceToken {
    pub fn parse(raw: &str) -> Self {
        let t = raw.trim();
        if t == ANY_SOURCE_TOKEN {
            Self::AnySource
        } else {
            Self::Source(t.to_string())
        }
    }

    pub fn parse_list<S: AsRef<str>>(raw: &[S]) -> Vec<Self> {
        raw.iter().map(|s| Self::parse(s.as_ref())).collect()
    }
}

/// Ordered token lists for the preferred-source fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPreferences {
    pub name: Vec<PreferenceToken>,
    pub description: Vec<PreferenceToken>,
    pub images: Vec<PreferenceToken>,
}

impl Default for FieldPreferences {
    fn default() -> Self {
        Self {
            name: vec![PreferenceToken::AnySource],
            description: vec![PreferenceToken::AnySource],
            images: vec![PreferenceToken::AnySource],
        }
    }
}

// ---------------------------------------------------------------------------
// Preferred-source strategy
// ---------------------------------------------------------------------------

/// Blankness as seen by the `AnySource` token.
pub trait FieldValue {
    fn is_blank(&self) -> bool;
}

impl FieldValue for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T> FieldValue for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// First match wins over `tokens`; never aggregates.
///
/// A named source that carries the sku stops the search even when its value
/// is blank. A named source missing from `provenance` is skipped.
pub fn resolve_preferred<T, F>(
    sku: &str,
    provenance: &[String],
    table: &RecordTable<'_>,
    tokens: &[PreferenceToken],
    field: F,
) -> Option<T>
where
    T: FieldValue + Clone,
    F: Fn(&SourceRecord) -> Option<&T>,
{
    for token in tokens {
        match token {
            PreferenceToken::AnySource => {
                let hit = provenance
                    .iter()
                    .filter_map(|source| table.get(source, sku))
                    .filter_map(|record| field(record))
                    .find(|value| !value.is_blank());
                if let Some(value) = hit {
                    return Some(value.clone());
                }
            }
            PreferenceToken::Source(name) => {
                if provenance.iter().any(|s| s == name) {
                    return table.get(name, sku).and_then(|r| field(r).cloned());
                }
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Cheapest-source strategy
// ---------------------------------------------------------------------------

/// The single source whose stock, categories and raw price are used.
#[derive(Debug, Clone, PartialEq)]
pub struct CheapestOffer {
    pub source_name: String,
    pub raw_price: f64,
    pub stock: u32,
    pub categories: Vec<Category>,
}

/// Minimum raw price across the provenance; ties go to the earliest source.
pub fn resolve_cheapest(
    sku: &str,
    provenance: &[String],
    table: &RecordTable<'_>,
) -> Option<CheapestOffer> {
    let offers: Vec<(&String, &SourceRecord)> = provenance
        .iter()
        .filter_map(|source| table.get(source, sku).map(|r| (source, r)))
        .collect();

    let min = offers
        .iter()
        .map(|(_, r)| r.regular_price)
        .fold(f64::INFINITY, f64::min);

    offers
        .into_iter()
        .find(|(_, r)| r.regular_price == min)
        .map(|(source, r)| CheapestOffer {
            source_name: source.clone(),
            raw_price: r.regular_price,
            stock: r.stock,
            categories: r.categories.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use psync_testkit::{record, source_set, RecordBuilder};

    fn name_of(r: &SourceRecord) -> Option<&String> {
        r.name.as_ref()
    }

    fn provenance(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn any_source_picks_first_non_blank_in_provenance_order() {
        let sources = source_set(vec![
            ("a", vec![RecordBuilder::new("a", "1").name("").build()]),
            ("b", vec![RecordBuilder::new("b", "1").name("Bravo").build()]),
            ("c", vec![RecordBuilder::new("c", "1").name("Charlie").build()]),
        ]);
        let table = RecordTable::build(&sources);

        let got = resolve_preferred(
            "1",
            &provenance(&["a", "b", "c"]),
            &table,
            &[PreferenceToken::AnySource],
            name_of,
        );
        assert_eq!(got.as_deref(), Some("Bravo"));
    }

    #[test]
    fn absent_named_source_falls_through_to_next_token() {
        let sources = source_set(vec![
            ("sourceA", vec![RecordBuilder::new("sourceA", "1").name("").build()]),
            ("sourceC", vec![RecordBuilder::new("sourceC", "1").name("From C").build()]),
        ]);
        let table = RecordTable::build(&sources);
        let tokens = PreferenceToken::parse_list(&["sourceB", "source"]);

        let got = resolve_preferred(
            "1",
            &provenance(&["sourceA", "sourceC"]),
            &table,
            &tokens,
            name_of,
        );
        assert_eq!(got.as_deref(), Some("From C"));
    }

    #[test]
    fn present_named_source_short_circuits_on_blank_value() {
        let sources = source_set(vec![
            ("sourceA", vec![RecordBuilder::new("sourceA", "1").name("From A").build()]),
            ("sourceB", vec![RecordBuilder::new("sourceB", "1").name("").build()]),
        ]);
        let table = RecordTable::build(&sources);
        let tokens = PreferenceToken::parse_list(&["sourceB", "source"]);

        let got = resolve_preferred(
            "1",
            &provenance(&["sourceA", "sourceB"]),
            &table,
            &tokens,
            name_of,
        );
        assert_eq!(got.as_deref(), Some(""));
    }

    #[test]
    fn exhausted_tokens_resolve_to_none() {
        let sources = source_set(vec![("a", vec![record("a", "1", 1.0)])]);
        let table = RecordTable::build(&sources);
        let tokens = PreferenceToken::parse_list(&["zzz", "source"]);

        let got = resolve_preferred("1", &provenance(&["a"]), &table, &tokens, name_of);
        assert_eq!(got, None);
    }

    #[test]
    fn cheapest_takes_first_minimum_and_couples_stock_and_categories() {
        let sources = source_set(vec![
            ("A", vec![RecordBuilder::new("A", "1").price(10.0).stock(1).category("a-cat").build()]),
            ("B", vec![RecordBuilder::new("B", "1").price(7.0).stock(2).category("b-cat").build()]),
            ("C", vec![RecordBuilder::new("C", "1").price(7.0).stock(3).category("c-cat").build()]),
        ]);
        let table = RecordTable::build(&sources);

        let offer = resolve_cheapest("1", &provenance(&["A", "B", "C"]), &table).unwrap();
        assert_eq!(offer.source_name, "B");
        assert_eq!(offer.raw_price, 7.0);
        assert_eq!(offer.stock, 2);
        assert_eq!(offer.categories.len(), 1);
        assert_eq!(offer.categories[0].name, "b-cat");
    }

    #[test]
    fn cheapest_with_empty_provenance_is_none() {
        let sources = source_set(vec![]);
        let table = RecordTable::build(&sources);
        assert!(resolve_cheapest("1", &[], &table).is_none());
    }
}
