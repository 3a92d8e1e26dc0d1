//! Command handler modules for psync.
//!
//! The pipeline stages shared by `run`, `plan` and `merge` live here.
//! Command-specific logic lives in the submodules.

pub mod merge;
pub mod plan;
pub mod run;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use psync_config::settings::Overrides;
use psync_config::{
    report_unused_keys, LoadedConfig, PullerConfig, ResolvedSecrets, RunMode, UnusedKeyPolicy,
};
use psync_schemas::CanonicalProduct;
use psync_sources::{
    cleanup, download_all, ingest, AdapterRegistry, AllowList, FetchReport, SourceSpec,
};
use psync_woo::{WooClient, WooConfig};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Load, type and check the layered config for `mode`.
///
/// Unused keys fail a live `run` and only warn otherwise.
pub fn load_config(
    paths: &[PathBuf],
    mode: RunMode,
    overrides: Overrides,
) -> Result<(LoadedConfig, PullerConfig)> {
    let loaded = psync_config::load_layered_yaml(paths)?;
    let config = PullerConfig::from_json(&loaded.config_json, overrides)?;

    let policy = if mode == RunMode::Run && !config.dryrun {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(mode, &loaded.config_json, policy)?;
    if !report.is_clean() {
        warn!(
            mode = mode.as_str(),
            unused_leaf_keys = report.unused_leaf_pointers.len(),
            "CONFIG_UNUSED_KEYS"
        );
        for p in report.unused_leaf_pointers.iter().take(50) {
            warn!(pointer = %p, "unused config key");
        }
    }

    info!(
        mode = mode.as_str(),
        config_hash = %loaded.config_hash,
        sources = config.active_sources().count(),
        dryrun = config.dryrun,
        "config loaded"
    );
    Ok((loaded, config))
}

/// Timeout for every outbound request: the destination's, else the client default.
fn network_timeout(config: &PullerConfig) -> Duration {
    config
        .destination
        .as_ref()
        .map(|d| d.timeout)
        .unwrap_or(psync_woo::DEFAULT_TIMEOUT)
}

// ---------------------------------------------------------------------------
// Catalog assembly
// ---------------------------------------------------------------------------

pub fn load_allow_list(config: &PullerConfig) -> Result<AllowList> {
    let source = config
        .allow_list
        .as_ref()
        .context("allow_list is not configured")?;
    let list = AllowList::load(source, network_timeout(config)).context("failed to load allow-list")?;
    info!(skus = list.len(), "allow-list loaded");
    Ok(list)
}

/// Download all sources on a short-lived runtime. No runtime is started when
/// the run reads local files only.
pub fn download(config: &PullerConfig) -> Result<FetchReport> {
    if config.use_local {
        info!("use_local set; reading source files from work_dir");
        return Ok(FetchReport::default());
    }
    let specs: Vec<SourceSpec> = config.active_sources().cloned().collect();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start download runtime")?;
    let report = rt.block_on(download_all(
        &specs,
        &config.work_dir,
        network_timeout(config),
        false,
    ));
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "downloads finished"
    );
    Ok(report)
}

/// Allow-list, download, ingest and reconcile.
///
/// A source whose download failed is not read at all, so a stale file left
/// in `work_dir` by an earlier run cannot stand in for it.
pub fn build_catalog(config: &PullerConfig) -> Result<Vec<CanonicalProduct>> {
    let allow = load_allow_list(config)?;
    let fetched = download(config)?;

    let failed: BTreeSet<&str> = fetched
        .outcomes
        .iter()
        .filter(|(_, r)| r.is_err())
        .map(|(name, _)| name.as_str())
        .collect();
    let specs: Vec<SourceSpec> = config
        .active_sources()
        .filter(|s| !failed.contains(s.name.as_str()))
        .cloned()
        .collect();

    let report = ingest(
        &specs,
        &config.work_dir,
        &AdapterRegistry::with_builtins(),
        &allow,
    );
    for (name, e) in report.failures() {
        warn!(source = name, error = %e, "source skipped");
    }

    let products = psync_merge::reconcile(&report.sources, &config.merge);
    info!(
        sources = report.sources.len(),
        unique_skus = products.len(),
        "catalog merged"
    );
    Ok(products)
}

pub fn write_products(path: &Path, products: &[CanonicalProduct]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output dir: {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(products).context("products serialize failed")?;
    fs::write(path, body).with_context(|| format!("failed to write products: {}", path.display()))?;
    info!(path = %path.display(), products = products.len(), "products written");
    Ok(())
}

/// Remove downloaded source files when the config asks for it.
pub fn cleanup_sources(config: &PullerConfig) {
    if !config.cleanup {
        return;
    }
    let specs: Vec<SourceSpec> = config.active_sources().cloned().collect();
    cleanup(&specs, &config.work_dir);
}

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

pub fn woo_client(config: &PullerConfig, secrets: &ResolvedSecrets) -> Result<WooClient> {
    let dest = config
        .destination
        .as_ref()
        .context("destination is not configured")?;
    let key = secrets
        .consumer_key
        .clone()
        .context("destination consumer key is not set")?;
    let secret = secrets
        .consumer_secret
        .clone()
        .context("destination consumer secret is not set")?;

    let mut woo = WooConfig::new(&dest.base_url, key, secret);
    woo.page_size = dest.page_size;
    woo.timeout = dest.timeout;
    WooClient::new(woo).context("failed to build destination client")
}
