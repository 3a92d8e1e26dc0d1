use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Append-only log file in addition to stderr.
const LOG_FILE_ENV: &str = "PSYNC_LOG_FILE";

#[derive(Parser)]
#[command(name = "psync")]
#[command(about = "Supplier catalog to WooCommerce product sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, merge and publish the catalog
    Run {
        /// Config paths in merge order (base -> env -> local ...)
        #[arg(long = "config", required = true)]
        config: Vec<PathBuf>,

        /// Write the merged products to output_path and dispatch nothing
        #[arg(long, conflicts_with = "no_dryrun")]
        dryrun: bool,

        /// Dispatch to the destination even if the config says dryrun
        #[arg(long = "no-dryrun")]
        no_dryrun: bool,

        /// Read source files already in work_dir instead of downloading
        #[arg(long = "use-local")]
        use_local: bool,

        /// Keep downloaded source files after the run
        #[arg(long = "no-cleanup")]
        no_cleanup: bool,
    },

    /// Diff against the destination and print the decisions; dispatch nothing
    Plan {
        #[arg(long = "config", required = true)]
        config: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t = SinkKind::Woo)]
        sink: SinkKind,

        #[arg(long = "use-local")]
        use_local: bool,

        #[arg(long = "no-cleanup")]
        no_cleanup: bool,
    },

    /// Merge local source files into canonical products JSON
    Merge {
        #[arg(long = "config", required = true)]
        config: Vec<PathBuf>,

        /// Output file (defaults to output_path from config)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// WooCommerce REST API from `destination`
    Woo,
    /// Empty in-memory catalog: everything is a create
    Memory,
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match std::env::var_os(LOG_FILE_ENV) {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file: {}", path.to_string_lossy()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

fn execute(cli: Cli) -> Result<()> {
    match cli.cmd {
        Commands::Run {
            config,
            dryrun,
            no_dryrun,
            use_local,
            no_cleanup,
        } => {
            let overrides = psync_config::settings::Overrides {
                dryrun: if dryrun {
                    Some(true)
                } else if no_dryrun {
                    Some(false)
                } else {
                    None
                },
                use_local: use_local.then_some(true),
                cleanup: no_cleanup.then_some(false),
            };
            commands::run::run(&config, overrides)
        }

        Commands::Plan {
            config,
            sink,
            use_local,
            no_cleanup,
        } => {
            let overrides = psync_config::settings::Overrides {
                dryrun: None,
                use_local: use_local.then_some(true),
                cleanup: no_cleanup.then_some(false),
            };
            commands::plan::plan(&config, sink, overrides)
        }

        Commands::Merge { config, out } => commands::merge::merge(&config, out),

        Commands::ConfigHash { paths } => {
            let loaded = psync_config::load_layered_yaml(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    dotenvy::from_filename(".env.local").ok();

    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("ERROR: {e:#}");
        return ExitCode::FAILURE;
    }

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "psync failed");
            ExitCode::FAILURE
        }
    }
}
