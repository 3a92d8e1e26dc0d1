use psync_reconcile::CatalogPlan;
use tracing::{info, warn};

use crate::batch::{batch, BatchSize};
use crate::sink::{BatchVerb, CatalogSink, OutboundProduct, SinkError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub update_chunks: usize,
    pub create_chunks: usize,
    pub update_records: usize,
    pub create_records: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl DispatchSummary {
    pub fn delivered_chunks(&self) -> usize {
        self.update_chunks + self.create_chunks
    }
}

/// A chunk failed. Everything before it (across both verbs) was delivered.
#[derive(Debug, thiserror::Error)]
#[error(
    "{verb} chunk {chunk_index} failed after {delivered_chunks} delivered chunk(s): {source}"
)]
pub struct DispatchError {
    pub verb: BatchVerb,
    /// 0-based index within the failing verb's chunk sequence.
    pub chunk_index: usize,
    pub delivered_chunks: usize,
    pub partial: DispatchSummary,
    #[source]
    pub source: SinkError,
}

/// Send `plan` to `sink`: all update chunks, then all create chunks.
pub fn dispatch<S>(
    sink: &mut S,
    plan: &CatalogPlan,
    size: BatchSize,
) -> Result<DispatchSummary, DispatchError>
where
    S: CatalogSink + ?Sized,
{
    let updates: Vec<OutboundProduct> = plan
        .update
        .iter()
        .map(|u| OutboundProduct {
            id: u.destination_id,
            product: u.product.clone(),
        })
        .collect();
    let creates: Vec<OutboundProduct> = plan
        .create
        .iter()
        .map(|p| OutboundProduct {
            id: None,
            product: p.clone(),
        })
        .collect();

    let mut summary = DispatchSummary::default();
    send_all(sink, BatchVerb::Update, &updates, size, &mut summary)?;
    send_all(sink, BatchVerb::Create, &creates, size, &mut summary)?;

    info!(
        updated = summary.update_records,
        created = summary.create_records,
        chunks = summary.delivered_chunks(),
        rejected = summary.rejected,
        "dispatch complete"
    );
    Ok(summary)
}

fn send_all<S>(
    sink: &mut S,
    verb: BatchVerb,
    records: &[OutboundProduct],
    size: BatchSize,
    summary: &mut DispatchSummary,
) -> Result<(), DispatchError>
where
    S: CatalogSink + ?Sized,
{
    let chunks = batch(records, size);
    let total = chunks.len();

    for (chunk_index, chunk) in chunks.into_iter().enumerate() {
        info!(
            %verb,
            chunk = chunk_index + 1,
            of = total,
            records = chunk.len(),
            "submitting batch"
        );

        let receipt = sink
            .submit_batch(verb, chunk)
            .map_err(|source| DispatchError {
                verb,
                chunk_index,
                delivered_chunks: summary.delivered_chunks(),
                partial: *summary,
                source,
            })?;

        if receipt.rejected > 0 {
            warn!(%verb, chunk = chunk_index + 1, rejected = receipt.rejected, "destination rejected items");
        }

        match verb {
            BatchVerb::Update => {
                summary.update_chunks += 1;
                summary.update_records += chunk.len();
            }
            BatchVerb::Create => {
                summary.create_chunks += 1;
                summary.create_records += chunk.len();
            }
        }
        summary.accepted += receipt.accepted;
        summary.rejected += receipt.rejected;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCatalog;
    use psync_reconcile::diff;
    use psync_schemas::ManagedTag;
    use psync_testkit::{managed, products};

    #[test]
    fn updates_are_sent_before_creates() {
        let mut sink = InMemoryCatalog::with_existing(vec![managed(1, "10")]);
        let desired = products(&["10", "20"]);
        let plan = diff(&desired, &sink.fetch_all().unwrap(), &ManagedTag::default());

        let summary = dispatch(&mut sink, &plan, BatchSize::default()).unwrap();

        assert_eq!(summary.update_records, 1);
        assert_eq!(summary.create_records, 1);
        assert_eq!(
            sink.submissions(),
            &[(BatchVerb::Update, 1), (BatchVerb::Create, 1)]
        );
    }

    #[test]
    fn empty_plan_submits_nothing() {
        let mut sink = InMemoryCatalog::new();
        let summary = dispatch(&mut sink, &CatalogPlan::default(), BatchSize::default()).unwrap();
        assert_eq!(summary, DispatchSummary::default());
        assert!(sink.submissions().is_empty());
    }
}
