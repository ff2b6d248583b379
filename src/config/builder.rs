//! Client configuration and builder.
//!
//! This module provides the builder pattern for configuring the research
//! client.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use deepresearch::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .api_key("AIza...")
//!     .connect_timeout(Duration::from_secs(5))
//!     .build()?;
//! ```

use std::time::Duration;

use super::options::{PollPolicy, RetryPolicy};
use crate::{Error, Result};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the research client.
///
/// Use [`ClientConfig::builder()`] to create a new configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // Authentication
    pub(crate) api_key: String,

    // Endpoint
    pub(crate) base_url: String,
    pub(crate) connect_timeout: Duration,

    // Recovery tuning
    pub(crate) retry: RetryPolicy,
    pub(crate) poll: PollPolicy,
}

impl ClientConfig {
    /// Create a new builder for ClientConfig.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Resolve a configuration entirely from the environment.
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Get the reconnection backoff policy.
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Get the status-poll policy.
    pub fn poll(&self) -> PollPolicy {
        self.poll
    }
}

/// Builder for [`ClientConfig`].
///
/// Validation happens when [`build()`](ClientConfigBuilder::build) is
/// called; unset values fall back to the environment and the documented
/// defaults.
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    connect_timeout: Duration,
    retry: RetryPolicy,
    poll: PollPolicy,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            connect_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            poll: PollPolicy::default(),
        }
    }
}

impl ClientConfigBuilder {
    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------

    /// Use an API key directly instead of reading GEMINI_API_KEY.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    // -------------------------------------------------------------------------
    // Endpoint
    // -------------------------------------------------------------------------

    /// Override the API base URL (default: [`DEFAULT_BASE_URL`], or
    /// GEMINI_BASE_URL when set).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Timeout for establishing connections.
    ///
    /// Deliberately not an overall request timeout: a research stream
    /// legitimately stays open for many minutes.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    // -------------------------------------------------------------------------
    // Recovery tuning
    // -------------------------------------------------------------------------

    /// Override the reconnection backoff policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the status-poll policy.
    pub fn poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    // -------------------------------------------------------------------------
    // Build
    // -------------------------------------------------------------------------

    /// Build the configuration.
    ///
    /// This validates:
    /// - An API key is available (explicit or GEMINI_API_KEY)
    /// - Retry and poll policies have usable bounds
    pub fn build(self) -> Result<ClientConfig> {
        let api_key = resolve_api_key(self.api_key, std::env::var(API_KEY_ENV).ok())?;

        let base_url = self
            .base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::invalid_config("base URL is empty"));
        }

        if self.retry.max_retries == 0 {
            return Err(Error::invalid_config("max_retries must be at least 1"));
        }
        if self.retry.initial_delay.is_zero() {
            return Err(Error::invalid_config("initial retry delay must be positive"));
        }
        if self.poll.interval.is_zero() {
            return Err(Error::invalid_config("poll interval must be positive"));
        }
        if self.poll.max_polls == 0 {
            return Err(Error::invalid_config("max_polls must be at least 1"));
        }

        Ok(ClientConfig {
            api_key,
            base_url,
            connect_timeout: self.connect_timeout,
            retry: self.retry,
            poll: self.poll,
        })
    }
}

fn resolve_api_key(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    explicit
        .or(from_env)
        .filter(|key| !key.trim().is_empty())
        .ok_or(Error::MissingApiKey)
}
