//! A blocking `reqwest` client with per-prefix retry policies.
//!
//! [`retry_session`] is the factory used by the pipeline: it mounts one [`RetryConfig`]
//! on both `http://` and `https://`. Retries are only attempted for allowed methods and
//! only on retryable statuses or transient connection failures. When retries run out on
//! a status, the last response is returned as-is so the caller can inspect it.

use crate::http::error::TransportError;
use crate::http::transport::{Transport, TransportResponse};
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Upper bound on a single backoff sleep, in seconds.
pub const DEFAULT_BACKOFF_MAX_SECS: f64 = 120.0;

/// Statuses for which a `Retry-After` header is honoured.
const RETRY_AFTER_STATUS_CODES: [u16; 3] = [413, 429, 503];

/// Retry policy applied to every request sent through a mounted prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub total: u32,
    /// Seconds; the n-th retry waits `backoff_factor * 2^(n-1)`.
    pub backoff_factor: f64,
    pub backoff_max: f64,
    pub status_forcelist: BTreeSet<u16>,
    pub allowed_methods: BTreeSet<String>,
    pub respect_retry_after: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            total: 5,
            backoff_factor: 0.5,
            backoff_max: DEFAULT_BACKOFF_MAX_SECS,
            status_forcelist: BTreeSet::from([429, 500, 502, 503, 504]),
            allowed_methods: BTreeSet::from(["GET".to_string()]),
            respect_retry_after: true,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            total: 0,
            ..Self::default()
        }
    }

    pub fn allows_method(&self, method: &str) -> bool {
        self.allowed_methods
            .iter()
            .any(|m| m.eq_ignore_ascii_case(method))
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Sleep before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let secs = (self.backoff_factor * 2f64.powi(exponent))
            .min(self.backoff_max)
            .max(0.0);
        Duration::from_secs_f64(secs)
    }

    fn retry_after(&self, status: u16, headers: &HeaderMap) -> Option<Duration> {
        if !self.respect_retry_after || !RETRY_AFTER_STATUS_CODES.contains(&status) {
            return None;
        }
        parse_retry_after(headers)
    }
}

/// Reads an integral `Retry-After` header. HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request()
}

/// A blocking HTTP session whose retry behaviour is chosen by URL prefix.
#[derive(Debug, Clone)]
pub struct RetryingSession {
    client: Client,
    mounts: Vec<(String, RetryConfig)>,
    fallback: RetryConfig,
}

impl RetryingSession {
    /// Builds a session with a fresh client and `config` mounted on both schemes.
    pub fn new(config: &RetryConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(TransportError::ClientBuild)?;
        Ok(Self::with_client(client, config))
    }

    /// Wraps an existing client, mounting `config` on both schemes.
    pub fn with_client(client: Client, config: &RetryConfig) -> Self {
        let mut session = Self {
            client,
            mounts: Vec::new(),
            fallback: RetryConfig::none(),
        };
        session.mount("http://", config.clone());
        session.mount("https://", config.clone());
        session
    }

    /// Registers `config` for URLs starting with `prefix`, replacing any previous mount
    /// for the same prefix. The longest matching prefix wins.
    pub fn mount(&mut self, prefix: impl Into<String>, config: RetryConfig) {
        let prefix = prefix.into();
        self.mounts.retain(|(existing, _)| *existing != prefix);
        self.mounts.push((prefix, config));
        self.mounts
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    }

    pub fn policy_for(&self, url: &str) -> &RetryConfig {
        let url = url.to_ascii_lowercase();
        self.mounts
            .iter()
            .find(|(prefix, _)| url.starts_with(&prefix.to_ascii_lowercase()))
            .map(|(_, config)| config)
            .unwrap_or(&self.fallback)
    }
}

/// Builds the retrying session used by the fetch pipeline.
pub fn retry_session(config: &RetryConfig) -> Result<RetryingSession, TransportError> {
    RetryingSession::new(config)
}

impl Transport for RetryingSession {
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let policy = self.policy_for(url);
        let may_retry = policy.allows_method("GET");
        let mut retries = 0u32;

        loop {
            match self.client.get(url).query(query).timeout(timeout).send() {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if may_retry && retries < policy.total && policy.is_retryable_status(status)
                    {
                        retries += 1;
                        let delay = policy
                            .retry_after(status, response.headers())
                            .unwrap_or_else(|| policy.backoff(retries));
                        warn!(
                            "GET {} returned {}; retry {}/{} in {:?}",
                            url, status, retries, policy.total, delay
                        );
                        thread::sleep(delay);
                        continue;
                    }

                    let final_url = response.url().to_string();
                    let body = response.bytes().map_err(|e| TransportError::ReadBody {
                        url: final_url.clone(),
                        source: e,
                    })?;
                    debug!("GET {} -> {} ({} bytes)", final_url, status, body.len());
                    return Ok(TransportResponse::new(final_url, status, body.to_vec()));
                }
                Err(e) if may_retry && retries < policy.total && is_transient(&e) => {
                    retries += 1;
                    let delay = policy.backoff(retries);
                    warn!(
                        "GET {} failed ({}); retry {}/{} in {:?}",
                        url, e, retries, policy.total, delay
                    );
                    thread::sleep(delay);
                }
                Err(e) => {
                    return Err(TransportError::Request {
                        url: url.to_string(),
                        source: e,
                    })
                }
            }
        }
    }
}
