//! psync-dispatch
//!
//! Delivers a [`psync_reconcile::CatalogPlan`] to a destination sink in
//! fixed-size chunks.
//!
//! - Updates go first, then creates; chunks are sent one at a time.
//! - No retries. The first failed chunk stops the dispatch and is returned
//!   with how many chunks were already delivered. Delivered chunks stay
//!   delivered; there is no rollback.

mod batch;
mod dispatcher;
pub mod memory;
mod sink;

pub use batch::{batch, BatchSize, BatchError};
pub use dispatcher::{dispatch, DispatchError, DispatchSummary};
pub use memory::InMemoryCatalog;
pub use sink::{BatchReceipt, BatchVerb, CatalogSink, OutboundProduct, SinkError};
