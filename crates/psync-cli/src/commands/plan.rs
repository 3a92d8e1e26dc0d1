//! `psync plan`: diff against the destination, dispatch nothing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use psync_config::settings::Overrides;
use psync_config::{resolve_secrets, RunMode};
use psync_dispatch::{CatalogSink, InMemoryCatalog};
use psync_reconcile::{diff, SkipReason};

use super::{build_catalog, cleanup_sources, load_config, woo_client};
use crate::SinkKind;

pub fn plan(paths: &[PathBuf], sink: SinkKind, overrides: Overrides) -> Result<()> {
    let (loaded, config) = load_config(paths, RunMode::Plan, overrides)?;

    let sink: Box<dyn CatalogSink> = match sink {
        SinkKind::Woo => {
            let secrets = resolve_secrets(&loaded.config_json, RunMode::Plan, false)?;
            Box::new(woo_client(&config, &secrets)?)
        }
        SinkKind::Memory => Box::new(InMemoryCatalog::new()),
    };

    let products = build_catalog(&config);
    cleanup_sources(&config);
    let products = products?;

    let existing = sink
        .fetch_all()
        .context("failed to read destination catalog")?;
    let plan = diff(&products, &existing, &config.managed_tag);

    let counts = plan.summary();
    println!("create={}", counts.create);
    println!("update={}", counts.update);
    println!("skip={}", counts.skip);
    for skipped in &plan.skip {
        println!("skipped sku={} reason={}", skipped.sku, reason_label(skipped.reason));
    }
    Ok(())
}

fn reason_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::ManualOverride => "manual_override",
    }
}
