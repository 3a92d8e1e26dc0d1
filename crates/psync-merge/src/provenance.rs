use std::collections::HashMap;

use psync_schemas::{SourceRecord, SourceSet};

/// sku -> sources that supplied it, in source declaration order.
///
/// Sku order is first-encounter order while scanning sources, which is also
/// the output order of the merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvenanceIndex {
    order: Vec<String>,
    by_sku: HashMap<String, Vec<String>>,
}

impl ProvenanceIndex {
    pub fn build(sources: &SourceSet) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut by_sku: HashMap<String, Vec<String>> = HashMap::new();

        for entry in sources.iter() {
            for record in &entry.records {
                match by_sku.get_mut(&record.sku) {
                    Some(list) => {
                        if !list.iter().any(|s| s == &entry.name) {
                            list.push(entry.name.clone());
                        }
                    }
                    None => {
                        order.push(record.sku.clone());
                        by_sku.insert(record.sku.clone(), vec![entry.name.clone()]);
                    }
                }
            }
        }

        Self { order, by_sku }
    }

    pub fn skus(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Empty slice for an unknown sku.
    pub fn provenance(&self, sku: &str) -> &[String] {
        self.by_sku.get(sku).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Random access to the first record a source supplied for a sku.
///
/// A supplier listing the same sku twice contributes only its first row.
#[derive(Debug, Default)]
pub struct RecordTable<'a> {
    by_source: HashMap<&'a str, HashMap<&'a str, &'a SourceRecord>>,
}

impl<'a> RecordTable<'a> {
    pub fn build(sources: &'a SourceSet) -> Self {
        let mut by_source: HashMap<&'a str, HashMap<&'a str, &'a SourceRecord>> = HashMap::new();
        for entry in sources.iter() {
            let rows = by_source.entry(entry.name.as_str()).or_default();
            for record in &entry.records {
                rows.entry(record.sku.as_str()).or_insert(record);
            }
        }
        Self { by_source }
    }

    pub fn get(&self, source: &str, sku: &str) -> Option<&'a SourceRecord> {
        self.by_source.get(source)?.get(sku).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psync_testkit::{record, source_set};

    #[test]
    fn provenance_follows_declaration_order_without_duplicates() {
        let sources = source_set(vec![
            ("a", vec![record("a", "1", 5.0), record("a", "1", 6.0)]),
            ("b", vec![record("b", "2", 1.0), record("b", "1", 2.0)]),
        ]);
        let index = ProvenanceIndex::build(&sources);

        assert_eq!(index.skus().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(index.provenance("1"), ["a".to_string(), "b".to_string()]);
        assert_eq!(index.provenance("2"), ["b".to_string()]);
        assert!(index.provenance("missing").is_empty());
    }

    #[test]
    fn record_table_keeps_first_row_per_source() {
        let sources = source_set(vec![(
            "a",
            vec![record("a", "1", 5.0), record("a", "1", 6.0)],
        )]);
        let table = RecordTable::build(&sources);

        let first = table.get("a", "1").map(|r| r.regular_price);
        assert_eq!(first, Some(5.0));
        assert!(table.get("b", "1").is_none());
    }
}
