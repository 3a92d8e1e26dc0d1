use std::fmt;

use psync_schemas::{CanonicalProduct, DestinationProduct};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchVerb {
    Create,
    Update,
}

impl BatchVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchVerb::Create => "create",
            BatchVerb::Update => "update",
        }
    }
}

impl fmt::Display for BatchVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical product as submitted to the sink. Updates carry the
/// destination id resolved during diff.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutboundProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub product: CanonicalProduct,
}

/// What the sink reported for one submitted chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReceipt {
    pub accepted: usize,
    /// Items the sink answered with an item-level error.
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("destination returned http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("destination response could not be decoded: {0}")]
    Decode(String),
    #[error("destination rejected the request: {0}")]
    Rejected(String),
}

/// Destination catalog contract.
///
/// Implementations must be object-safe so the CLI can pick one at runtime.
pub trait CatalogSink {
    /// Full snapshot of the destination catalog.
    fn fetch_all(&self) -> Result<Vec<DestinationProduct>, SinkError>;

    /// Submit one chunk. An `Err` means the whole chunk is in doubt.
    fn submit_batch(
        &mut self,
        verb: BatchVerb,
        records: &[OutboundProduct],
    ) -> Result<BatchReceipt, SinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use psync_testkit::product;

    #[test]
    fn outbound_product_flattens_and_omits_missing_id() {
        let create = serde_json::to_value(OutboundProduct {
            id: None,
            product: product("42"),
        })
        .unwrap();
        assert!(create.get("id").is_none());
        assert_eq!(create["sku"], "42");

        let update = serde_json::to_value(OutboundProduct {
            id: Some(7),
            product: product("42"),
        })
        .unwrap();
        assert_eq!(update["id"], 7);
        assert_eq!(update["sku"], "42");
    }
}
