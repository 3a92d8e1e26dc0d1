//! Shared product data model.
//!
//! Every crate in the workspace speaks these types: source adapters produce
//! [`SourceRecord`]s grouped in a [`SourceSet`], the merge engine turns them
//! into [`CanonicalProduct`]s, and the diff engine compares those against
//! [`DestinationProduct`] snapshots.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Source side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub src: String,
}

impl ProductImage {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }
}

/// Category as reported by a supplier. Some suppliers only publish names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

impl Category {
    pub fn new(id: Option<i64>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(None, name)
    }
}

/// One supplier row after column mapping (the fixed seven-field shape plus
/// the name of the source that produced it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source_name: String,
    pub sku: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock: u32,
    pub categories: Vec<Category>,
    /// Raw supplier price, before tiering. Always finite and >= 0.
    pub regular_price: f64,
    pub images: Vec<ProductImage>,
}

/// A supplier's eligible records.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    pub name: String,
    pub records: Vec<SourceRecord>,
}

/// Per-source record sets, kept in configuration declaration order.
///
/// Order matters: provenance lists and output order are derived from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSet {
    entries: Vec<SourceEntry>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records for `name`. A name seen before keeps its original
    /// position and gets the records appended.
    pub fn insert(&mut self, name: impl Into<String>, records: Vec<SourceRecord>) {
        let name = name.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.records.extend(records),
            None => self.entries.push(SourceEntry { name, records }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[SourceRecord]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.records.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceEntry> {
        self.entries.iter()
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.entries.iter().map(|e| e.records.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Canonical side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Pending,
}

/// Tag reference as attached to outgoing products (id only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: u64,
}

/// The merged record for one sku. Built once per run, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub sku: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock: u32,
    pub categories: Vec<Category>,
    /// Tiered (and taxed) price.
    pub regular_price: f64,
    pub images: Option<Vec<ProductImage>>,
    pub tags: Vec<TagRef>,
    pub status: ProductStatus,
}

// ---------------------------------------------------------------------------
// Destination side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationTag {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Snapshot of one product already in the destination catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationProduct {
    /// Destination-assigned id; required to address batch updates.
    #[serde(default)]
    pub id: Option<u64>,
    pub sku: String,
    #[serde(default)]
    pub tags: Vec<DestinationTag>,
}

/// Marker tag identifying records under automated control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedTag {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

impl Default for ManagedTag {
    fn default() -> Self {
        Self {
            id: 790,
            name: "bot".to_string(),
            slug: "bot".to_string(),
        }
    }
}

impl ManagedTag {
    pub fn tag_ref(&self) -> TagRef {
        TagRef { id: self.id }
    }

    /// Tags are matched by id; name/slug are informational.
    pub fn is_present_in(&self, tags: &[DestinationTag]) -> bool {
        tags.iter().any(|t| t.id == self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(source: &str, sku: &str) -> SourceRecord {
        SourceRecord {
            source_name: source.to_string(),
            sku: sku.to_string(),
            name: None,
            description: None,
            stock: 1,
            categories: vec![],
            regular_price: 1.0,
            images: vec![],
        }
    }

    #[test]
    fn source_set_keeps_declaration_order() {
        let mut set = SourceSet::new();
        set.insert("b", vec![rec("b", "1")]);
        set.insert("a", vec![rec("a", "1")]);
        set.insert("b", vec![rec("b", "2")]);

        assert_eq!(set.source_names(), vec!["b", "a"]);
        assert_eq!(set.get("b").map(|r| r.len()), Some(2));
        assert_eq!(set.total_records(), 3);
    }

    #[test]
    fn managed_tag_matches_by_id() {
        let tag = ManagedTag::default();
        let tags = vec![DestinationTag {
            id: 790,
            name: "renamed".into(),
            slug: "renamed".into(),
        }];
        assert!(tag.is_present_in(&tags));
        assert!(!tag.is_present_in(&[]));
    }

    #[test]
    fn category_without_id_serializes_name_only() {
        let json = serde_json::to_string(&Category::named("Cables")).unwrap();
        assert_eq!(json, r#"{"name":"Cables"}"#);
    }
}
