//! psync-reconcile
//!
//! Catalog diff engine: desired canonical products vs. the destination
//! snapshot.
//!
//! Decisions:
//! - sku known at destination and still carrying the managed tag => Update
//! - sku known at destination without the managed tag => Skip (manual override)
//! - sku unknown at destination => Create
//! - a manual override never turns into a Create either
//!
//! Deterministic, pure logic. No IO. No destination calls.

mod engine;
mod identity;
pub mod snapshot_adapter;
mod types;

pub use engine::{decide, diff, ExistingCatalog, ExistingEntry};
pub use identity::SkuIdentity;
pub use types::*;
