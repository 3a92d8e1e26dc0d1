//! Source files → eligible records.
//!
//! Per active source, in declaration order: read table, adapt, keep
//! `stock > 0`, keep allow-listed skus. Counts are logged at each stage.
//! A source that fails contributes nothing and is reported; a source that
//! reads fine but ends up empty is still present in the [`SourceSet`].

use std::path::Path;

use psync_schemas::{SourceRecord, SourceSet};
use tracing::{error, info};

use crate::adapter::AdapterRegistry;
use crate::allow_list::AllowList;
use crate::error::SourceContributionError;
use crate::fetch::source_path;
use crate::spec::SourceSpec;
use crate::table::{RawTable, TableDialect, TableError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Data rows in the file.
    pub rows: usize,
    /// Rows the adapter turned into records.
    pub mapped: usize,
    /// Rows the adapter dropped.
    pub rejected: usize,
    pub in_stock: usize,
    pub allowed: usize,
}

#[derive(Debug)]
pub struct SourceOutcome {
    pub name: String,
    pub result: Result<IngestStats, SourceContributionError>,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub sources: SourceSet,
    pub outcomes: Vec<SourceOutcome>,
}

impl IngestReport {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SourceContributionError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }
}

pub fn ingest(
    specs: &[SourceSpec],
    work_dir: &Path,
    registry: &AdapterRegistry,
    allow_list: &AllowList,
) -> IngestReport {
    let mut report = IngestReport::default();

    for spec in specs.iter().filter(|s| s.active) {
        info!(source = %spec.name, "processing source");
        let result = read_source(spec, work_dir)
            .and_then(|table| ingest_table(&spec.name, &table, registry, allow_list));

        let result = match result {
            Ok((records, stats)) => {
                info!(
                    source = %spec.name,
                    rows = stats.rows,
                    mapped = stats.mapped,
                    rejected = stats.rejected,
                    in_stock = stats.in_stock,
                    allowed = stats.allowed,
                    "source ingested"
                );
                report.sources.insert(spec.name.clone(), records);
                Ok(stats)
            }
            Err(e) => {
                error!(source = %spec.name, error = %e, "source contributes nothing this run");
                Err(e)
            }
        };
        report.outcomes.push(SourceOutcome {
            name: spec.name.clone(),
            result,
        });
    }

    info!(
        sources = report.sources.len(),
        records = report.sources.total_records(),
        "ingest complete"
    );
    report
}

fn read_source(spec: &SourceSpec, work_dir: &Path) -> Result<RawTable, SourceContributionError> {
    let path = source_path(work_dir, &spec.name);
    let dialect = TableDialect::from_spec(spec)?;
    match RawTable::read(&path, &dialect) {
        Ok(t) => Ok(t),
        Err(TableError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(SourceContributionError::NotFound(path))
        }
        Err(e) => Err(e.into()),
    }
}

/// Adapt one table and apply the eligibility filters.
pub fn ingest_table(
    source_name: &str,
    table: &RawTable,
    registry: &AdapterRegistry,
    allow_list: &AllowList,
) -> Result<(Vec<SourceRecord>, IngestStats), SourceContributionError> {
    let adapter = registry
        .get(source_name)
        .ok_or_else(|| SourceContributionError::NoAdapter(source_name.to_string()))?;

    let adapted = adapter.adapt(table)?;
    let mut stats = IngestStats {
        rows: table.len(),
        mapped: adapted.records.len(),
        rejected: adapted.rejected,
        ..IngestStats::default()
    };

    let in_stock: Vec<SourceRecord> = adapted.records.into_iter().filter(|r| r.stock > 0).collect();
    stats.in_stock = in_stock.len();

    let allowed: Vec<SourceRecord> = in_stock
        .into_iter()
        .filter(|r| allow_list.contains(&r.sku))
        .collect();
    stats.allowed = allowed.len();

    Ok((allowed, stats))
}
