//! `psync merge`: offline reconcile of files already in `work_dir`.

use std::path::PathBuf;

use anyhow::Result;
use psync_config::settings::Overrides;
use psync_config::RunMode;

use super::{build_catalog, load_config, write_products};

/// Never downloads and never removes the input files.
pub fn merge(paths: &[PathBuf], out: Option<PathBuf>) -> Result<()> {
    let overrides = Overrides {
        dryrun: Some(true),
        use_local: Some(true),
        cleanup: Some(false),
    };
    let (_, config) = load_config(paths, RunMode::Merge, overrides)?;

    let products = build_catalog(&config)?;
    let out = out.unwrap_or_else(|| config.output_path.clone());
    write_products(&out, &products)?;
    println!("products={} path={}", products.len(), out.display());
    Ok(())
}
