//! Source download.
//!
//! Each active, non-local source is fetched into `<work_dir>/<name>.csv` on
//! its own task. All tasks are awaited; a failure is recorded for that source
//! and the rest carry on.

use std::io::Read;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ssh2::Session;
use tracing::{error, info, warn};

use crate::error::SourceContributionError;
use crate::spec::{SourceKind, SourceSpec};
use crate::table::{RawTable, TableDialect, TableError};

const SFTP_DEFAULT_PORT: u16 = 22;
const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http {status} from {url}")]
    Status { status: u16, url: String },
    #[error("body is not a readable table: {0}")]
    InvalidTable(#[from] TableError),
    #[error("cannot write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("source is missing required setting '{0}'")]
    MissingSetting(&'static str),
    #[error("credential env var '{0}' is not set")]
    MissingCredential(String),
    #[error("sftp: {0}")]
    Sftp(#[from] ssh2::Error),
    #[error("download task did not complete: {0}")]
    Join(String),
    #[error("download setup failed: {0}")]
    Setup(String),
}

/// `<work_dir>/<name>.csv`
pub fn source_path(work_dir: &Path, source_name: &str) -> PathBuf {
    work_dir.join(format!("{source_name}.csv"))
}

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, spec: &SourceSpec, dest: &Path) -> Result<(), FetchError>;
}

/// HTTP GET; the body is checked to be a readable table before it is
/// written, so a broken feed never replaces nothing with garbage.
#[derive(Debug, Clone)]
pub struct EndpointFetcher {
    http: reqwest::Client,
}

impl EndpointFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl SourceFetcher for EndpointFetcher {
    async fn fetch(&self, spec: &SourceSpec, dest: &Path) -> Result<(), FetchError> {
        let url = spec
            .download_url
            .as_deref()
            .ok_or(FetchError::MissingSetting("download_url"))?;

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.bytes().await?;

        RawTable::parse(&body, &TableDialect::from_spec(spec)?)?;

        tokio::fs::write(dest, &body)
            .await
            .map_err(|source| FetchError::Io {
                path: dest.to_path_buf(),
                source,
            })
    }
}

/// SFTP download of `<transfer_path>/<expected_file>` using password auth.
/// `download_url` holds `host` or `host:port`.
#[derive(Debug, Clone, Default)]
pub struct TransferFetcher;

#[async_trait]
impl SourceFetcher for TransferFetcher {
    async fn fetch(&self, spec: &SourceSpec, dest: &Path) -> Result<(), FetchError> {
        let host = spec
            .download_url
            .clone()
            .ok_or(FetchError::MissingSetting("download_url"))?;
        let dir = spec
            .transfer_path
            .clone()
            .ok_or(FetchError::MissingSetting("transfer_path"))?;
        let file = spec
            .expected_file
            .clone()
            .ok_or(FetchError::MissingSetting("expected_file"))?;
        let creds = spec
            .credentials
            .as_ref()
            .ok_or(FetchError::MissingSetting("credentials"))?;
        let username = read_env(&creds.username_env)?;
        let password = read_env(&creds.password_env)?;
        let remote = format!("{}/{}", dir.trim_end_matches('/'), file);
        let dest = dest.to_path_buf();

        tokio::task::spawn_blocking(move || {
            sftp_download(&host, &username, &password, &remote, &dest)
        })
        .await
        .map_err(|e| FetchError::Join(e.to_string()))?
    }
}

fn read_env(name: &str) -> Result<String, FetchError> {
    std::env::var(name).map_err(|_| FetchError::MissingCredential(name.to_string()))
}

fn sftp_download(
    host: &str,
    username: &str,
    password: &str,
    remote: &str,
    dest: &Path,
) -> Result<(), FetchError> {
    let addr = if host.contains(':') {
        host.to_string()
    } else {
        format!("{host}:{SFTP_DEFAULT_PORT}")
    };
    let io_err = |source| FetchError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let tcp = TcpStream::connect(&addr).map_err(io_err)?;
    let mut session = Session::new()?;
    session.set_tcp_stream(tcp);
    session.handshake()?;
    session.userauth_password(username, password)?;

    let sftp = session.sftp()?;
    let mut remote_file = sftp.open(Path::new(remote))?;

    let mut body = Vec::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = remote_file.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }

    std::fs::write(dest, &body).map_err(io_err)
}

/// One entry per attempted source, in declaration order.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub outcomes: Vec<(String, Result<PathBuf, SourceContributionError>)>,
}

impl FetchReport {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, r)| r.is_err()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.len() - self.failed()
    }
}

fn fetcher_for(
    kind: SourceKind,
    endpoint: &Arc<EndpointFetcher>,
) -> Arc<dyn SourceFetcher> {
    match kind {
        SourceKind::Endpoint => {
            let f: Arc<dyn SourceFetcher> = endpoint.clone();
            f
        }
        SourceKind::Transfer => Arc::new(TransferFetcher),
    }
}

/// Download every active source that is not marked `use_local`.
///
/// `use_local_all` skips downloads entirely (the whole run reads local
/// files). Must be called from within a tokio runtime.
pub async fn download_all(
    specs: &[SourceSpec],
    work_dir: &Path,
    timeout: Duration,
    use_local_all: bool,
) -> FetchReport {
    let mut report = FetchReport::default();
    if use_local_all {
        info!("use_local set; skipping all downloads");
        return report;
    }

    let setup = match tokio::fs::create_dir_all(work_dir).await {
        Ok(()) => EndpointFetcher::new(timeout).map(Arc::new),
        Err(source) => Err(FetchError::Io {
            path: work_dir.to_path_buf(),
            source,
        }),
    };
    let endpoint = match setup {
        Ok(f) => f,
        Err(e) => {
            error!(error = %e, "cannot start downloads");
            let message = e.to_string();
            for spec in specs.iter().filter(|s| s.active && !s.use_local) {
                report.outcomes.push((
                    spec.name.clone(),
                    Err(FetchError::Setup(message.clone()).into()),
                ));
            }
            return report;
        }
    };

    let mut handles = Vec::new();
    for spec in specs.iter().filter(|s| s.active && !s.use_local) {
        let fetcher = fetcher_for(spec.kind, &endpoint);
        let spec = spec.clone();
        let name = spec.name.clone();
        let dest = source_path(work_dir, &spec.name);
        info!(source = %name, kind = ?spec.kind, "downloading source");
        let handle = tokio::spawn(async move {
            fetcher.fetch(&spec, &dest).await.map(|()| dest)
        });
        handles.push((name, handle));
    }

    for (name, handle) in handles {
        let result = match handle.await {
            Ok(Ok(path)) => {
                info!(source = %name, path = %path.display(), "source downloaded");
                Ok(path)
            }
            Ok(Err(e)) => {
                error!(source = %name, error = %e, "source download failed");
                Err(e.into())
            }
            Err(e) => {
                error!(source = %name, error = %e, "source download task failed");
                Err(FetchError::Join(e.to_string()).into())
            }
        };
        report.outcomes.push((name, result));
    }
    report
}

/// Remove the downloaded file of every active source. Missing files are
/// ignored; returns how many files were removed.
pub fn cleanup(specs: &[SourceSpec], work_dir: &Path) -> usize {
    let mut removed = 0;
    for spec in specs.iter().filter(|s| s.active) {
        let path = source_path(work_dir, &spec.name);
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(source = %spec.name, error = %e, "could not remove local file"),
        }
    }
    info!(removed, "local source files cleaned up");
    removed
}
