//! Explorer configuration.
//!
//! Values are layered: built-in defaults, then `APD_*` environment variables,
//! then whatever the CLI sets explicitly on top of the returned struct.

use anyhow::{Context, Result};
use std::env;
use std::env::VarError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REMOTE_URL: &str = "https://github.com/awesomedata/apd-core";
pub const DEFAULT_CHECKOUT_DIR: &str = "apd-core";
pub const DEFAULT_DESCRIPTOR_SUBDIR: &str = "core";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_URL_CACHE_TTL: Duration = Duration::from_secs(600);

const ENV_REMOTE_URL: &str = "APD_REMOTE_URL";
const ENV_CHECKOUT_DIR: &str = "APD_CHECKOUT_DIR";
const ENV_HTTP_TIMEOUT_SECS: &str = "APD_HTTP_TIMEOUT_SECS";
const ENV_URL_CACHE_TTL_SECS: &str = "APD_URL_CACHE_TTL_SECS";
const ENV_SKIP_SYNC: &str = "APD_SKIP_SYNC";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// Clone URL of the metadata repository.
    pub remote_url: String,
    /// Local checkout of `remote_url`.
    pub checkout_dir: PathBuf,
    /// Directory inside the checkout holding `<category>/<file>` descriptors.
    pub descriptor_subdir: PathBuf,
    /// Hard timeout applied to every HEAD request.
    pub http_timeout: Duration,
    /// How long a reachability verdict is trusted.
    pub url_cache_ttl: Duration,
    /// Use the existing checkout as-is instead of cloning/pulling.
    pub skip_sync: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            checkout_dir: PathBuf::from(DEFAULT_CHECKOUT_DIR),
            descriptor_subdir: PathBuf::from(DEFAULT_DESCRIPTOR_SUBDIR),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            url_cache_ttl: DEFAULT_URL_CACHE_TTL,
            skip_sync: false,
        }
    }
}

impl ExplorerConfig {
    /// Defaults overlaid with the `APD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_non_empty)
    }

    /// Same as [`ExplorerConfig::from_env`] but reads variables through
    /// `lookup`, so callers can layer their own sources.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(remote) = lookup(ENV_REMOTE_URL) {
            config.remote_url = remote;
        }
        if let Some(dir) = lookup(ENV_CHECKOUT_DIR) {
            config.checkout_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            config.http_timeout = parse_secs(ENV_HTTP_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_URL_CACHE_TTL_SECS) {
            config.url_cache_ttl = parse_secs(ENV_URL_CACHE_TTL_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SKIP_SYNC) {
            config.skip_sync = parse_flag(&raw);
        }
        Ok(config)
    }

    /// Root directory handed to the catalog loader.
    pub fn descriptor_root(&self) -> PathBuf {
        self.checkout_dir.join(&self.descriptor_subdir)
    }
}

pub fn env_non_empty(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        Ok(_) => None,
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(os)) => Some(os.to_string_lossy().into_owned()),
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a whole number of seconds, got '{raw}'"))?;
    Ok(Duration::from_secs(secs))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
