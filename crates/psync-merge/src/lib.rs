//! psync-merge
//!
//! Multi-source reconciliation: one canonical product per sku out of many
//! supplier record sets.
//!
//! - Provenance is fixed once per run, in source declaration order.
//! - name/description/images use the preferred-source strategy.
//! - stock/categories/price come from the cheapest source, as one unit.
//! - Prices are tiered first-match in declared order.
//!
//! Deterministic, pure logic. No IO.

mod engine;
mod provenance;
mod resolve;
mod tier;

pub use engine::{merge_one, reconcile, MergeSettings};
pub use provenance::{ProvenanceIndex, RecordTable};
pub use resolve::{
    resolve_cheapest, resolve_preferred, CheapestOffer, FieldPreferences, FieldValue,
    PreferenceToken,
};
pub use tier::{tier_price, PriceTier, PriceTiers, TierBound, TierConfigError};
