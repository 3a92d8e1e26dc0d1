use serde::Deserialize;

/// How a source's file reaches the work dir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Plain HTTP GET of `download_url`.
    Endpoint,
    /// SFTP download of `<transfer_path>/<expected_file>` from the host in
    /// `download_url`.
    #[serde(alias = "ftp")]
    Transfer,
}

/// Row parsing strictness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// Ragged rows are accepted; short rows read as blank cells.
    #[default]
    #[serde(alias = "tolerant")]
    Python,
    /// A row whose field count differs from the first row fails the table.
    #[serde(alias = "strict")]
    C,
}

/// Env var NAMES holding the SFTP login. Values are never stored in config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferCredentials {
    pub username_env: String,
    pub password_env: String,
}

/// One configured supplier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub separator: Option<String>,
    /// Header row index; an explicit `null` means the file has no header.
    #[serde(default = "default_header")]
    pub header: Option<usize>,
    #[serde(default)]
    pub column_names: Option<Vec<String>>,
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub transfer_path: Option<String>,
    #[serde(default)]
    pub expected_file: Option<String>,
    #[serde(default)]
    pub credentials: Option<TransferCredentials>,
    /// Skip the download and read whatever is already in the work dir.
    #[serde(default)]
    pub use_local: bool,
}

fn default_true() -> bool {
    true
}

fn default_header() -> Option<usize> {
    Some(0)
}

impl SourceSpec {
    /// Minimal active endpoint source, mostly for tests and programmatic use.
    pub fn endpoint(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            kind: SourceKind::Endpoint,
            download_url: Some(download_url.into()),
            encoding: None,
            separator: None,
            header: default_header(),
            column_names: None,
            engine: Engine::default(),
            transfer_path: None,
            expected_file: None,
            credentials: None,
            use_local: false,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_absent_vs_null() {
        let absent: SourceSpec =
            serde_json::from_str(r#"{"name":"mcr","type":"endpoint"}"#).unwrap();
        assert_eq!(absent.header, Some(0));
        assert!(absent.active);
        assert_eq!(absent.engine, Engine::Python);

        let null: SourceSpec =
            serde_json::from_str(r#"{"name":"mcr","type":"endpoint","header":null}"#).unwrap();
        assert_eq!(null.header, None);
    }

    #[test]
    fn ftp_is_an_alias_for_transfer() {
        let spec: SourceSpec =
            serde_json::from_str(r#"{"name":"bts","type":"ftp","engine":"c"}"#).unwrap();
        assert_eq!(spec.kind, SourceKind::Transfer);
        assert_eq!(spec.engine, Engine::C);
    }
}
