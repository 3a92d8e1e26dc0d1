//! Runtime secret resolution.
//!
//! # Contract
//! - Config YAML stores only env var NAMES (`destination.keys_env.*`).
//! - Callers invoke [`resolve_secrets`] once at startup and pass the result
//!   into constructors; no other code reads credential env vars for the
//!   destination.
//! - `Debug` redacts values. Errors name the env var, never the value.
//!
//! SFTP source credentials follow the same convention but are read by the
//! transfer fetcher at download time, since each source names its own vars.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::consumption::RunMode;

pub const DEFAULT_CONSUMER_KEY_ENV: &str = "WOO_CONSUMER_KEY";
pub const DEFAULT_CONSUMER_SECRET_ENV: &str = "WOO_CONSUMER_SECRET";

#[derive(Clone)]
pub struct ResolvedSecrets {
    /// `None` if the named env var was absent or blank.
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field(
                "consumer_key",
                &self.consumer_key.as_ref().map(|_| "<REDACTED>"),
            )
            .field(
                "consumer_secret",
                &self.consumer_secret.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

fn read_str_at(config: &Value, pointer: &str) -> Option<String> {
    let s = config.pointer(pointer)?.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Env var names for the destination credentials, with defaults.
pub fn destination_env_names(config_json: &Value) -> (String, String) {
    (
        read_str_at(config_json, "/destination/keys_env/consumer_key")
            .unwrap_or_else(|| DEFAULT_CONSUMER_KEY_ENV.to_string()),
        read_str_at(config_json, "/destination/keys_env/consumer_secret")
            .unwrap_or_else(|| DEFAULT_CONSUMER_SECRET_ENV.to_string()),
    )
}

/// Resolve destination credentials.
///
/// | Mode  | Required                          |
/// |-------|-----------------------------------|
/// | RUN   | key + secret unless `dryrun`      |
/// | PLAN  | key + secret                      |
/// | MERGE | nothing                           |
pub fn resolve_secrets(config_json: &Value, mode: RunMode, dryrun: bool) -> Result<ResolvedSecrets> {
    let (key_var, secret_var) = destination_env_names(config_json);
    let consumer_key = resolve_env(&key_var);
    let consumer_secret = resolve_env(&secret_var);

    let required = match mode {
        RunMode::Run => !dryrun,
        RunMode::Plan => true,
        RunMode::Merge => false,
    };

    if required {
        if consumer_key.is_none() {
            bail!(
                "SECRETS_MISSING mode={}: required env var '{}' \
                 (destination consumer_key) is not set or empty",
                mode.as_str(),
                key_var,
            );
        }
        if consumer_secret.is_none() {
            bail!(
                "SECRETS_MISSING mode={}: required env var '{}' \
                 (destination consumer_secret) is not set or empty",
                mode.as_str(),
                secret_var,
            );
        }
    }

    Ok(ResolvedSecrets {
        consumer_key,
        consumer_secret,
    })
}
