//! `psync run`: the full pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use psync_config::settings::Overrides;
use psync_config::state::format_check;
use psync_config::{
    resolve_last_check, resolve_secrets, PullerConfig, ResolvedSecrets, RunMode, RunState,
};
use psync_dispatch::{dispatch, CatalogSink};
use psync_reconcile::diff;
use tracing::info;

use super::{build_catalog, cleanup_sources, load_config, woo_client, write_products};

pub fn run(paths: &[PathBuf], overrides: Overrides) -> Result<()> {
    let started = Utc::now();
    let (loaded, config) = load_config(paths, RunMode::Run, overrides)?;
    let secrets = resolve_secrets(&loaded.config_json, RunMode::Run, config.dryrun)?;

    let last_check = resolve_last_check(
        config.last_check.as_deref(),
        &config.state_path,
        &config.date_format,
        started,
    )?;
    info!(last_check = %last_check, dryrun = config.dryrun, "run started");

    let result = execute(&config, &secrets, started);
    cleanup_sources(&config);
    result
}

fn execute(config: &PullerConfig, secrets: &ResolvedSecrets, started: DateTime<Utc>) -> Result<()> {
    let products = build_catalog(config)?;

    if config.dryrun {
        write_products(&config.output_path, &products)?;
        info!("dry run: nothing dispatched");
        return Ok(());
    }

    let mut sink = woo_client(config, secrets)?;
    let existing = sink
        .fetch_all()
        .context("failed to read destination catalog")?;
    info!(existing = existing.len(), "destination catalog read");

    let plan = diff(&products, &existing, &config.managed_tag);
    let counts = plan.summary();
    info!(
        create = counts.create,
        update = counts.update,
        skip = counts.skip,
        "catalog diffed"
    );

    let summary = dispatch(&mut sink, &plan, config.batch_size)?;
    info!(
        chunks = summary.delivered_chunks(),
        accepted = summary.accepted,
        rejected = summary.rejected,
        "catalog dispatched"
    );

    let state = RunState {
        last_check: format_check(started, &config.date_format),
    };
    state.save(&config.state_path)?;
    info!(last_check = %state.last_check, path = %config.state_path.display(), "run state saved");
    Ok(())
}
