//! Snapshot adapter: deserialize the destination's product wire format and
//! normalize it to [`DestinationProduct`].
//!
//! # Purpose
//! The destination REST API returns full product documents. The diff engine
//! only needs `id`, `sku` and `tags`; everything else is ignored here.
//!
//! # Design constraints
//! - Pure conversion. No IO, no destination calls.
//! - `sku` may arrive as a string, a number or null; it is kept as text and
//!   coerced later by the diff engine, never here.
//! - Tags without an id cannot be compared against the managed tag and are
//!   rejected with [`SnapshotAdapterError`].

use psync_schemas::{DestinationProduct, DestinationTag};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotAdapterError {
    #[error("destination product payload could not be decoded: {0}")]
    Decode(String),
    #[error("destination product {product} has a tag without id")]
    TagWithoutId { product: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDestinationTag {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDestinationProduct {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub sku: Value,
    #[serde(default)]
    pub tags: Vec<RawDestinationTag>,
}

fn sku_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

pub fn normalize_product(raw: RawDestinationProduct) -> Result<DestinationProduct, SnapshotAdapterError> {
    let sku = sku_text(&raw.sku);
    let mut tags = Vec::with_capacity(raw.tags.len());
    for t in raw.tags {
        let id = t.id.ok_or_else(|| SnapshotAdapterError::TagWithoutId {
            product: raw
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| format!("sku={sku}")),
        })?;
        tags.push(DestinationTag {
            id,
            name: t.name.unwrap_or_default(),
            slug: t.slug.unwrap_or_default(),
        });
    }
    Ok(DestinationProduct {
        id: raw.id,
        sku,
        tags,
    })
}

pub fn normalize(raw: Vec<RawDestinationProduct>) -> Result<Vec<DestinationProduct>, SnapshotAdapterError> {
    raw.into_iter().map(normalize_product).collect()
}

/// Decode one page (a JSON array of products) and normalize it.
pub fn parse_page(body: &str) -> Result<Vec<DestinationProduct>, SnapshotAdapterError> {
    let raw: Vec<RawDestinationProduct> =
        serde_json::from_str(body).map_err(|e| SnapshotAdapterError::Decode(e.to_string()))?;
    normalize(raw)
}
