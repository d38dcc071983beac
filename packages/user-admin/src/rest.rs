//! Minimal client for the users/emails REST backend.
//!
//! The client knows nothing about admin state. It sends a [`RequestSpec`]
//! and returns the body of a 2xx answer as text; everything else becomes a
//! [`RequestError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use user_admin::{Command, RestClient};
//!
//! let client = RestClient::new("http://localhost:2000")?;
//! let body = client.send(&Command::FetchUsers.request()).await?;
//! ```

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::command::RequestSpec;
use crate::config::{Config, DEFAULT_REQUEST_TIMEOUT};
use crate::error::{RequestError, Result};

#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    debug: bool,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Every request sent by this client fails once `timeout` elapses.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            debug: false,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_timeout(&config.base_url, config.request_timeout)?.with_debug(config.debug))
    }

    /// Append `debug` to every query so the server returns detailed errors.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        if self.debug {
            url.push(if path.contains('?') { '&' } else { '?' });
            url.push_str("debug");
        }
        url
    }

    /// Perform the request and return the success body as text.
    pub async fn send(&self, spec: &RequestSpec) -> Result<String> {
        let url = self.url_for(&spec.path);
        debug!(method = %spec.method, %url, "sending request");

        let mut request = self.client.request(spec.method.clone(), &url);
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RequestError::from_response(status, &body));
        }

        let body = resp.text().await?;
        debug!(method = %spec.method, %url, status = status.as_u16(), bytes = body.len(), "request succeeded");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let client = RestClient::new("http://localhost:2000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:2000");
        assert_eq!(client.url_for("/rest/users"), "http://localhost:2000/rest/users");
    }

    #[test]
    fn test_debug_flag_extends_query() {
        let client = RestClient::new("http://h").unwrap().with_debug(true);
        assert_eq!(client.url_for("/rest/users"), "http://h/rest/users?debug");
        assert_eq!(
            client.url_for("/rest/emails?user_id=5"),
            "http://h/rest/emails?user_id=5&debug"
        );
    }
}
