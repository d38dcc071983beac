use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::machine::LockPolicy;

pub const DEFAULT_BASE_URL: &str = "http://localhost:2000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the REST server; `/rest/...` paths are appended to it.
    pub base_url: String,
    pub request_timeout: Duration,
    /// Ask the server for detailed error messages (`?debug`).
    pub debug: bool,
    pub lock_policy: LockPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            debug: false,
            lock_policy: LockPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let request_timeout = match var("ADMIN_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .context("ADMIN_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => defaults.request_timeout,
        };

        let debug = match var("ADMIN_DEBUG") {
            Some(raw) => parse_flag(&raw).context("ADMIN_DEBUG must be true or false")?,
            None => defaults.debug,
        };

        let lock_policy = match var("ADMIN_LOCK_POLICY") {
            Some(raw) => raw
                .parse::<LockPolicy>()
                .map_err(anyhow::Error::msg)
                .context("ADMIN_LOCK_POLICY is invalid")?,
            None => defaults.lock_policy,
        };

        Ok(Self {
            base_url: var("ADMIN_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout,
            debug,
            lock_policy,
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("not a boolean: {}", other),
    }
}
