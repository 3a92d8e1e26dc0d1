//! The externally maintained list of skus we are allowed to sell.
//!
//! The list is a single-column CSV without a header, usually exported from a
//! shared spreadsheet. Extra columns and blank lines are tolerated.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum AllowListError {
    #[error("allow-list request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("allow-list export returned http {0}")]
    Status(u16),
    #[error("cannot read allow-list '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("allow-list is not valid csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Where the allow-list comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AllowListSource {
    Sheet { doc_url: String, sheet_name: String },
    Path { path: PathBuf },
}

/// `{doc_url}/export?gid=0&format=csv&sheet={sheet_name}` with spaces in the
/// sheet name encoded as `%20`.
pub fn sheet_export_url(doc_url: &str, sheet_name: &str) -> String {
    format!(
        "{}/export?gid=0&format=csv&sheet={}",
        doc_url.trim_end_matches('/'),
        sheet_name.replace(' ', "%20")
    )
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    skus: HashSet<String>,
}

impl AllowList {
    pub fn parse(bytes: &[u8]) -> Result<Self, AllowListError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut skus = HashSet::new();
        for record in reader.records() {
            let record = record?;
            if let Some(sku) = record.get(0).map(str::trim).filter(|s| !s.is_empty()) {
                skus.insert(sku.to_string());
            }
        }
        Ok(Self { skus })
    }

    pub fn from_path(path: &Path) -> Result<Self, AllowListError> {
        let bytes = std::fs::read(path).map_err(|source| AllowListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&bytes)
    }

    pub fn fetch(url: &str, timeout: Duration) -> Result<Self, AllowListError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        let resp = client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AllowListError::Status(status.as_u16()));
        }
        Self::parse(&resp.bytes()?)
    }

    pub fn load(source: &AllowListSource, timeout: Duration) -> Result<Self, AllowListError> {
        let list = match source {
            AllowListSource::Sheet {
                doc_url,
                sheet_name,
            } => Self::fetch(&sheet_export_url(doc_url, sheet_name), timeout)?,
            AllowListSource::Path { path } => Self::from_path(path)?,
        };
        info!(skus = list.len(), "allow-list loaded");
        Ok(list)
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.skus.contains(sku)
    }

    pub fn len(&self) -> usize {
        self.skus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skus.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            skus: iter.into_iter().map(Into::into).collect(),
        }
    }
}
