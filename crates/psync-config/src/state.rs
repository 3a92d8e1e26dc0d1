//! Persisted run state.
//!
//! Only `last_check` today: the timestamp of the last successful non-dry
//! run, written after dispatch completes.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub last_check: String,
}

impl RunState {
    /// `Ok(None)` when the file does not exist yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let raw = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read state: {}", path.display()))
            }
        };
        let state = serde_json::from_str(&raw)
            .with_context(|| format!("invalid state file: {}", path.display()))?;
        Ok(Some(state))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create state dir: {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(self).context("state serialize failed")?;
        fs::write(path, body).with_context(|| format!("failed to write state: {}", path.display()))
    }
}

pub fn format_check(at: DateTime<Utc>, date_format: &str) -> String {
    at.format(date_format).to_string()
}

/// Config value, else the state file, else today 00:00 UTC.
pub fn resolve_last_check(
    configured: Option<&str>,
    state_path: &Path,
    date_format: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    if let Some(v) = configured {
        return Ok(v.to_string());
    }
    if let Some(state) = RunState::load(state_path)? {
        return Ok(state.last_check);
    }
    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);
    Ok(format_check(midnight, date_format))
}
