use std::collections::HashMap;

use psync_schemas::{CanonicalProduct, DestinationProduct, ManagedTag};

use crate::identity::SkuIdentity;
use crate::types::{CatalogPlan, Decision, SkipReason};

/// What the destination knows about one sku identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExistingEntry {
    /// Id of the first destination product with this identity.
    pub destination_id: Option<u64>,
    /// True if any destination product with this identity lacks the managed tag.
    pub manually_overridden: bool,
}

/// Destination snapshot indexed by coerced sku identity.
#[derive(Clone, Debug, Default)]
pub struct ExistingCatalog {
    by_identity: HashMap<i64, ExistingEntry>,
    unmatchable: usize,
}

impl ExistingCatalog {
    pub fn from_snapshot(existing: &[DestinationProduct], managed_tag: &ManagedTag) -> Self {
        let mut by_identity: HashMap<i64, ExistingEntry> = HashMap::new();
        let mut unmatchable = 0;

        for product in existing {
            let Some(key) = SkuIdentity::coerce(&product.sku).key() else {
                unmatchable += 1;
                continue;
            };
            let overridden = !managed_tag.is_present_in(&product.tags);
            by_identity
                .entry(key)
                .and_modify(|e| e.manually_overridden |= overridden)
                .or_insert(ExistingEntry {
                    destination_id: product.id,
                    manually_overridden: overridden,
                });
        }

        Self {
            by_identity,
            unmatchable,
        }
    }

    pub fn lookup(&self, sku: &str) -> Option<&ExistingEntry> {
        let key = SkuIdentity::coerce(sku).key()?;
        self.by_identity.get(&key)
    }

    pub fn manually_overridden(&self, sku: &str) -> bool {
        self.lookup(sku).map(|e| e.manually_overridden).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    /// Destination products whose sku did not coerce (excluded from joins).
    pub fn unmatchable(&self) -> usize {
        self.unmatchable
    }
}

pub fn decide(product: &CanonicalProduct, existing: &ExistingCatalog) -> Decision {
    match existing.lookup(&product.sku) {
        None => Decision::Create,
        Some(entry) if entry.manually_overridden => Decision::Skip(SkipReason::ManualOverride),
        Some(entry) => Decision::Update {
            destination_id: entry.destination_id,
        },
    }
}

/// Partition `desired` into create/update/skip against `existing`.
pub fn diff(
    desired: &[CanonicalProduct],
    existing: &[DestinationProduct],
    managed_tag: &ManagedTag,
) -> CatalogPlan {
    let catalog = ExistingCatalog::from_snapshot(existing, managed_tag);
    let mut plan = CatalogPlan::default();
    for product in desired {
        plan.record(product, decide(product, &catalog));
    }
    plan
}
