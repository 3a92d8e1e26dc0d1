//! psync-sources
//!
//! Everything between a supplier feed and a [`psync_schemas::SourceSet`]:
//!
//! - `fetch`: download each active source into `<work_dir>/<name>.csv`
//!   (HTTP endpoint or SFTP transfer), concurrently, one outcome per source.
//! - `table`: decode and split a downloaded file into a [`RawTable`].
//! - `adapter`: per-source column mapping into [`psync_schemas::SourceRecord`]s.
//! - `allow_list`: the externally maintained set of sellable skus.
//! - `ingest`: table → adapter → stock filter → allow-list filter, with a
//!   per-source report. A failing source never aborts the others.

pub mod adapter;
pub mod allow_list;
mod error;
pub mod fetch;
pub mod ingest;
mod spec;
pub mod table;

pub use adapter::{AdaptOutcome, AdapterError, AdapterRegistry, ColumnMap, PriceFormat, SourceAdapter};
pub use allow_list::{sheet_export_url, AllowList, AllowListError, AllowListSource};
pub use error::SourceContributionError;
pub use fetch::{cleanup, download_all, source_path, FetchError, FetchReport};
pub use ingest::{ingest, ingest_table, IngestReport, IngestStats, SourceOutcome};
pub use spec::{Engine, SourceKind, SourceSpec, TransferCredentials};
pub use table::{RawTable, TableDialect, TableError};
