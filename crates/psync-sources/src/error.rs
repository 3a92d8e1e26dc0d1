use std::path::PathBuf;

use crate::adapter::AdapterError;
use crate::fetch::FetchError;
use crate::table::TableError;

/// Why a source contributed nothing this run. Recorded per source; never
/// aborts the other sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceContributionError {
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("no local file at {}", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("no adapter registered for source '{0}'")]
    NoAdapter(String),
}
