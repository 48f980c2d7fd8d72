//! Homepage reachability probing.
//!
//! A probe is a single HEAD request with redirects disabled. The outcome is
//! classified into a [`ReachabilityResult`] and never surfaces as an error;
//! [`HomepageStatus`] turns it into the message shown next to a dataset.

pub mod cache;
pub mod checker;

pub use cache::{ReachabilityCache, TtlCache};
pub use checker::UrlChecker;

use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReachabilityResult {
    /// The server answered. `redirect_location` is set for 301/302 only.
    Reachable {
        status: u16,
        redirect_location: Option<String>,
    },
    ConnectionError,
    SslError,
    InvalidSchema,
}

impl ReachabilityResult {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ReachabilityResult::Reachable { .. })
    }
}

/// Rewrite a leading `http:` to `https:` so insecure links are never shown
/// as the canonical homepage.
pub fn normalize_homepage(url: &str) -> String {
    let url = url.trim();
    match url.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("http:") => format!("https:{}", &url[5..]),
        _ => url.to_string(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl StatusLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLevel::Success => "ok",
            StatusLevel::Info => "info",
            StatusLevel::Warning => "warning",
            StatusLevel::Error => "error",
        }
    }
}

/// What the operator sees for a dataset homepage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HomepageStatus {
    pub url: String,
    pub level: StatusLevel,
    pub message: String,
    pub result: ReachabilityResult,
}

impl HomepageStatus {
    pub fn new(url: &str, result: ReachabilityResult) -> Self {
        let (level, message) = match &result {
            ReachabilityResult::Reachable {
                redirect_location: Some(location),
                ..
            } => (StatusLevel::Info, format!("{url}\nRedirects to {location}")),
            ReachabilityResult::Reachable { .. } => (StatusLevel::Success, url.to_string()),
            ReachabilityResult::ConnectionError => (
                StatusLevel::Error,
                format!("{url}\nThere is a connection issue to this website."),
            ),
            ReachabilityResult::SslError => (
                StatusLevel::Warning,
                format!("There might be an SSL issue with {url}\nProceed with caution!"),
            ),
            ReachabilityResult::InvalidSchema => (StatusLevel::Info, url.to_string()),
        };
        Self {
            url: url.to_string(),
            level,
            message,
            result,
        }
    }
}

impl fmt::Display for HomepageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}
