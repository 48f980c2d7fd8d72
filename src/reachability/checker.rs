use crate::reachability::ReachabilityResult;
use anyhow::{Context, Result};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;
use url::{ParseError, Url};

const SCHEME_FALLBACK_PREFIX: &str = "https://";

// Lower-cased fragments that identify TLS failures in the error chain below
// the request error (the request error itself embeds the URL).
const TLS_MARKERS: &[&str] = &["certificate", "ssl", "tls", "handshake"];

/// Issues HEAD probes with redirects disabled and a hard timeout.
#[derive(Clone, Debug)]
pub struct UrlChecker {
    client: Client,
}

impl UrlChecker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Self::client_builder(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self::from_client(client))
    }

    /// Builder preloaded with the probe settings, for callers that need to
    /// adjust proxies or TLS roots before building.
    pub fn client_builder(timeout: Duration) -> ClientBuilder {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(Policy::none())
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Probe `url`.
    ///
    /// A URL without a scheme is retried exactly once with `https://`
    /// prepended. Anything still unparsable, or with a scheme other than
    /// http/https, is [`ReachabilityResult::InvalidSchema`].
    pub fn check(&self, url: &str) -> ReachabilityResult {
        let Some(target) = resolve_target(url) else {
            debug!(url, "no usable scheme");
            return ReachabilityResult::InvalidSchema;
        };

        debug!(url = %target, "HEAD");
        match self.client.head(target).send() {
            Ok(response) => {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok());
                classify_response(response.status().as_u16(), location)
            }
            Err(err) => {
                debug!(url, error = %err, "HEAD failed");
                classify_error(&err)
            }
        }
    }
}

fn resolve_target(url: &str) -> Option<Url> {
    let url = url.trim();
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("{SCHEME_FALLBACK_PREFIX}{url}")).ok()?
        }
        Err(_) => return None,
    };
    let supported = matches!(parsed.scheme(), "http" | "https");
    (supported && parsed.has_host()).then_some(parsed)
}

pub(crate) fn classify_response(status: u16, location: Option<&str>) -> ReachabilityResult {
    let redirect_location = match status {
        301 | 302 => location.map(str::to_string),
        _ => None,
    };
    ReachabilityResult::Reachable {
        status,
        redirect_location,
    }
}

fn classify_error(err: &reqwest::Error) -> ReachabilityResult {
    if err.source().is_some_and(chain_mentions_tls) {
        return ReachabilityResult::SslError;
    }
    if err.is_builder() {
        return ReachabilityResult::InvalidSchema;
    }
    ReachabilityResult::ConnectionError
}

fn chain_mentions_tls(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_ascii_lowercase();
        if TLS_MARKERS.iter().any(|marker| text.contains(marker)) {
            return true;
        }
        current = e.source();
    }
    false
}
