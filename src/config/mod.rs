//! Configuration for the research client.
//!
//! This module provides:
//!
//! - [`ClientConfig`] and [`ClientConfigBuilder`] for configuring the client
//! - [`RetryPolicy`] for reconnection backoff tuning
//! - [`PollPolicy`] for status-poll tuning
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use deepresearch::config::{ClientConfig, RetryPolicy};
//!
//! let config = ClientConfig::builder()
//!     .api_key("AIza...")
//!     .retry_policy(RetryPolicy {
//!         max_retries: 5,
//!         ..RetryPolicy::default()
//!     })
//!     .build()?;
//! ```
//!
//! # Environment
//!
//! Unset values fall back to the environment: the API key comes from
//! `GEMINI_API_KEY` and the base URL from `GEMINI_BASE_URL`.

pub mod builder;
pub mod options;

// Re-export commonly used types
pub use builder::{API_KEY_ENV, BASE_URL_ENV, ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use options::{PollPolicy, RetryPolicy};
