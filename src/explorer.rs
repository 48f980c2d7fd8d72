//! Session state for one explorer process.
//!
//! Sync runs at most once and each descriptor root is loaded at most once
//! until [`Explorer::invalidate`] is called. Homepage probes go through a
//! TTL cache keyed by the normalized URL, so a verdict is trusted for
//! `url_cache_ttl` and no longer.

use crate::catalog::{DatasetDescriptor, LoadedCatalog, load_catalog};
use crate::config::ExplorerConfig;
use crate::reachability::{HomepageStatus, ReachabilityCache, UrlChecker, normalize_homepage};
use crate::sync::{SyncOutcome, ensure_local_mirror, is_checkout};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// How the checkout came to be usable for this session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncReport {
    Synced { outcome: SyncOutcome },
    /// Sync was disabled by configuration.
    Skipped,
    /// Sync failed but an earlier checkout exists and is used as-is.
    Stale { error: String },
}

pub struct Explorer {
    config: ExplorerConfig,
    checker: UrlChecker,
    url_cache: ReachabilityCache,
    // Held across the git subprocess; concurrent callers block until the one
    // sync finishes.
    sync_report: Mutex<Option<SyncReport>>,
    // Locked only for lookup and insert; two threads missing together may
    // both load, and the later insert wins.
    catalogs: Mutex<HashMap<PathBuf, Arc<LoadedCatalog>>>,
}

impl Explorer {
    pub fn new(config: ExplorerConfig) -> Result<Self> {
        let checker = UrlChecker::new(config.http_timeout)?;
        Ok(Self::with_checker(config, checker))
    }

    pub fn with_checker(config: ExplorerConfig, checker: UrlChecker) -> Self {
        let url_cache = ReachabilityCache::new(config.url_cache_ttl);
        Self {
            config,
            checker,
            url_cache,
            sync_report: Mutex::new(None),
            catalogs: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Make sure the checkout exists and is current, once per session.
    ///
    /// A failed sync is an error only when there is no earlier checkout to
    /// fall back to; failures are not memoized.
    pub fn sync(&self) -> Result<SyncReport> {
        let mut memo = lock(&self.sync_report);
        if let Some(report) = memo.as_ref() {
            return Ok(report.clone());
        }

        let report = if self.config.skip_sync {
            SyncReport::Skipped
        } else {
            match ensure_local_mirror(&self.config.remote_url, &self.config.checkout_dir) {
                Ok(outcome) => {
                    info!(
                        path = %self.config.checkout_dir.display(),
                        fresh = outcome.is_fresh(),
                        "checkout ready"
                    );
                    SyncReport::Synced { outcome }
                }
                Err(err) if is_checkout(&self.config.checkout_dir) => {
                    let error = format!("{:#}", anyhow::Error::new(err));
                    warn!(
                        path = %self.config.checkout_dir.display(),
                        %error,
                        "sync failed; using existing checkout"
                    );
                    SyncReport::Stale { error }
                }
                Err(err) => {
                    return Err(anyhow::Error::new(err).context(format!(
                        "syncing {} into {}",
                        self.config.remote_url,
                        self.config.checkout_dir.display()
                    )));
                }
            }
        };

        *memo = Some(report.clone());
        Ok(report)
    }

    /// Sync, then load the descriptor tree (memoized per root path).
    pub fn catalog(&self) -> Result<Arc<LoadedCatalog>> {
        self.sync()?;
        let root = self.config.descriptor_root();
        if let Some(loaded) = lock(&self.catalogs).get(&root) {
            return Ok(Arc::clone(loaded));
        }

        let loaded = Arc::new(
            load_catalog(&root)
                .with_context(|| format!("loading catalog from {}", root.display()))?,
        );
        lock(&self.catalogs).insert(root, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Forget the sync result and every loaded catalog.
    pub fn invalidate(&self) {
        lock(&self.sync_report).take();
        lock(&self.catalogs).clear();
    }

    /// Reachability status of the descriptor's homepage, if it has one.
    pub fn homepage_status(&self, descriptor: &DatasetDescriptor) -> Option<HomepageStatus> {
        descriptor.homepage().map(|homepage| self.check_url(homepage))
    }

    /// Normalize `url` to https and probe it through the cache.
    pub fn check_url(&self, url: &str) -> HomepageStatus {
        let normalized = normalize_homepage(url);
        let result = self
            .url_cache
            .get_or_insert_with(&normalized, || self.checker.check(&normalized));
        HomepageStatus::new(&normalized, result)
    }

    pub fn url_cache(&self) -> &ReachabilityCache {
        &self.url_cache
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}
