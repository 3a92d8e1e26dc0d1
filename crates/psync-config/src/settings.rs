//! Typed, validated view of the merged config document.
//!
//! Built once per run from [`crate::LoadedConfig::config_json`] and then only
//! read. Command-line switches are applied through [`Overrides`] before the
//! value is handed out.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::format::{Item, StrftimeItems};
use psync_dispatch::BatchSize;
use psync_merge::{FieldPreferences, MergeSettings, PreferenceToken, PriceTiers};
use psync_schemas::ManagedTag;
use psync_sources::{AllowListSource, SourceSpec};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawPullerConfig {
    dryrun: bool,
    cleanup: bool,
    use_local: bool,
    last_check: Option<String>,
    date_format: String,
    work_dir: PathBuf,
    batch_size: usize,
    state_path: PathBuf,
    output_path: Option<PathBuf>,
    sources: Vec<SourceSpec>,
    differential_price: Map<String, Value>,
    defaults: RawDefaults,
    tax: f64,
    allow_list: Option<AllowListSource>,
    destination: Option<RawDestination>,
}

impl Default for RawPullerConfig {
    fn default() -> Self {
        Self {
            dryrun: true,
            cleanup: true,
            use_local: false,
            last_check: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            work_dir: PathBuf::from("tmp"),
            batch_size: psync_dispatch::BatchSize::default().get(),
            state_path: PathBuf::from("psync-state.json"),
            output_path: None,
            sources: Vec::new(),
            differential_price: Map::new(),
            defaults: RawDefaults::default(),
            tax: 0.0,
            allow_list: None,
            destination: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawDefaults {
    name: Option<Vec<String>>,
    description: Option<Vec<String>>,
    images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawDestination {
    base_url: String,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default)]
    managed_tag: ManagedTag,
}

fn default_page_size() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq)]
pub struct DestinationSettings {
    pub base_url: String,
    pub page_size: u32,
    pub timeout: Duration,
}

/// Command-line switches that win over the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub dryrun: Option<bool>,
    pub use_local: Option<bool>,
    pub cleanup: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct PullerConfig {
    pub dryrun: bool,
    pub cleanup: bool,
    pub use_local: bool,
    pub last_check: Option<String>,
    pub date_format: String,
    pub work_dir: PathBuf,
    pub batch_size: BatchSize,
    pub state_path: PathBuf,
    pub output_path: PathBuf,
    pub sources: Vec<SourceSpec>,
    pub merge: MergeSettings,
    pub allow_list: Option<AllowListSource>,
    pub destination: Option<DestinationSettings>,
    pub managed_tag: ManagedTag,
}

impl PullerConfig {
    pub fn from_json(config_json: &Value, overrides: Overrides) -> Result<Self> {
        let raw: RawPullerConfig = serde_json::from_value(config_json.clone())
            .context("config does not match the expected shape")?;

        let batch_size = BatchSize::new(raw.batch_size).context("invalid batch_size")?;

        if !raw.tax.is_finite() || raw.tax < 0.0 {
            bail!("tax must be a non-negative number, got {}", raw.tax);
        }
        validate_date_format(&raw.date_format)?;

        let tiers = parse_tiers(&raw.differential_price)?;

        let managed_tag = raw
            .destination
            .as_ref()
            .map(|d| d.managed_tag.clone())
            .unwrap_or_default();

        let destination = match raw.destination {
            Some(d) => {
                if d.page_size == 0 {
                    bail!("destination.page_size must be greater than zero");
                }
                Some(DestinationSettings {
                    base_url: d.base_url,
                    page_size: d.page_size,
                    timeout: Duration::from_secs(d.timeout_secs),
                })
            }
            None => None,
        };

        let merge = MergeSettings {
            preferences: preferences(&raw.defaults),
            tiers,
            tax: raw.tax,
            managed_tag: managed_tag.tag_ref(),
        };

        let output_path = raw
            .output_path
            .unwrap_or_else(|| raw.work_dir.join("all_products.json"));

        Ok(Self {
            dryrun: overrides.dryrun.unwrap_or(raw.dryrun),
            cleanup: overrides.cleanup.unwrap_or(raw.cleanup),
            use_local: overrides.use_local.unwrap_or(raw.use_local),
            last_check: raw.last_check.filter(|s| !s.trim().is_empty()),
            date_format: raw.date_format,
            work_dir: raw.work_dir,
            batch_size,
            state_path: raw.state_path,
            output_path,
            sources: raw.sources,
            merge,
            allow_list: raw.allow_list,
            destination,
            managed_tag,
        })
    }

    pub fn active_sources(&self) -> impl Iterator<Item = &SourceSpec> {
        self.sources.iter().filter(|s| s.active)
    }
}

fn preferences(raw: &RawDefaults) -> FieldPreferences {
    let base = FieldPreferences::default();
    let pick = |v: &Option<Vec<String>>, fallback: Vec<PreferenceToken>| match v {
        Some(tokens) => PreferenceToken::parse_list(tokens.as_slice()),
        None => fallback,
    };
    FieldPreferences {
        name: pick(&raw.name, base.name.clone()),
        description: pick(&raw.description, base.description.clone()),
        images: pick(&raw.images, base.images.clone()),
    }
}

fn parse_tiers(raw: &Map<String, Value>) -> Result<PriceTiers> {
    let mut pairs: Vec<(&str, f64)> = Vec::with_capacity(raw.len());
    for (threshold, multiplier) in raw {
        let m = multiplier.as_f64().with_context(|| {
            format!("differential_price['{threshold}'] must be a number, got {multiplier}")
        })?;
        pairs.push((threshold.as_str(), m));
    }
    let tiers = PriceTiers::from_pairs(pairs).context("invalid differential_price")?;

    let shadowed = tiers.shadowed_count();
    if shadowed > 0 {
        warn!(
            shadowed,
            "differential_price has an infinite bucket before other tiers; those tiers never apply"
        );
    }
    Ok(tiers)
}

fn validate_date_format(fmt: &str) -> Result<()> {
    if StrftimeItems::new(fmt).any(|i| matches!(i, Item::Error)) {
        bail!("date_format '{fmt}' is not a valid strftime pattern");
    }
    Ok(())
}
