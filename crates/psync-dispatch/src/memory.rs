//! Deterministic in-memory destination.
//!
//! - Ids are assigned sequentially from one past the highest existing id.
//! - Tags are stored by id only; names and slugs of tags written through
//!   this sink are empty.
//! - `fail_on(n)` makes the n-th submission (1-based) fail once, which is
//!   how scenario tests exercise partial dispatch.

use std::collections::BTreeMap;

use psync_schemas::{DestinationProduct, DestinationTag};

use crate::sink::{BatchReceipt, BatchVerb, CatalogSink, OutboundProduct, SinkError};

#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    products: BTreeMap<u64, DestinationProduct>,
    next_id: u64,
    submissions: Vec<(BatchVerb, usize)>,
    fail_on: Option<usize>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Prime the catalog. Products without an id get one assigned.
    pub fn with_existing(existing: Vec<DestinationProduct>) -> Self {
        let mut catalog = Self::new();
        for p in &existing {
            if let Some(id) = p.id {
                catalog.next_id = catalog.next_id.max(id + 1);
            }
        }
        for mut p in existing {
            let id = match p.id {
                Some(id) => id,
                None => catalog.allocate_id(),
            };
            p.id = Some(id);
            catalog.products.insert(id, p);
        }
        catalog
    }

    pub fn fail_on(mut self, submission: usize) -> Self {
        self.fail_on = Some(submission);
        self
    }

    /// `(verb, chunk length)` for every submission attempt, failed ones included.
    pub fn submissions(&self) -> &[(BatchVerb, usize)] {
        &self.submissions
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&DestinationProduct> {
        self.products.get(&id)
    }

    pub fn skus(&self) -> Vec<&str> {
        self.products.values().map(|p| p.sku.as_str()).collect()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    fn stored(id: u64, record: &OutboundProduct) -> DestinationProduct {
        DestinationProduct {
            id: Some(id),
            sku: record.product.sku.clone(),
            tags: record
                .product
                .tags
                .iter()
                .map(|t| DestinationTag {
                    id: t.id,
                    name: String::new(),
                    slug: String::new(),
                })
                .collect(),
        }
    }
}

impl CatalogSink for InMemoryCatalog {
    fn fetch_all(&self) -> Result<Vec<DestinationProduct>, SinkError> {
        Ok(self.products.values().cloned().collect())
    }

    fn submit_batch(
        &mut self,
        verb: BatchVerb,
        records: &[OutboundProduct],
    ) -> Result<BatchReceipt, SinkError> {
        self.submissions.push((verb, records.len()));
        if self.fail_on == Some(self.submissions.len()) {
            return Err(SinkError::Rejected(format!(
                "injected failure on submission {}",
                self.submissions.len()
            )));
        }

        let mut receipt = BatchReceipt::default();
        for record in records {
            match verb {
                BatchVerb::Create => {
                    let id = self.allocate_id();
                    self.products.insert(id, Self::stored(id, record));
                    receipt.accepted += 1;
                }
                BatchVerb::Update => match record.id {
                    Some(id) if self.products.contains_key(&id) => {
                        self.products.insert(id, Self::stored(id, record));
                        receipt.accepted += 1;
                    }
                    _ => receipt.rejected += 1,
                },
            }
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psync_testkit::{managed, product};

    #[test]
    fn creates_get_ids_after_existing() {
        let mut sink = InMemoryCatalog::with_existing(vec![managed(7, "1")]);
        let rec = OutboundProduct {
            id: None,
            product: product("2"),
        };
        let receipt = sink.submit_batch(BatchVerb::Create, &[rec]).unwrap();
        assert_eq!(receipt.accepted, 1);
        assert_eq!(sink.get(8).map(|p| p.sku.as_str()), Some("2"));
    }

    #[test]
    fn update_of_unknown_id_is_rejected_item() {
        let mut sink = InMemoryCatalog::new();
        let rec = OutboundProduct {
            id: Some(99),
            product: product("2"),
        };
        let receipt = sink.submit_batch(BatchVerb::Update, &[rec]).unwrap();
        assert_eq!(receipt, BatchReceipt { accepted: 0, rejected: 1 });
        assert!(sink.is_empty());
    }
}
