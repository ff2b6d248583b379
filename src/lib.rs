//! # deepresearch
//!
//! Client for long-running deep-research interactions over a streaming API.
//!
//! A research run takes minutes to an hour, far longer than a single HTTP
//! connection reliably lives. This library submits the request, follows the
//! event stream, and reconnects from the last delivered event whenever the
//! connection drops, so callers consume one gap-free sequence:
//! - Streaming: every report delta and reasoning summary as it happens
//! - Polling: fire-and-forget with periodic status checks
//! - Resilience: exponential backoff, bounded retries, exact resume cursors
//!
//! ## Quick Start
//!
//! ```ignore
//! use deepresearch::{ResearchClient, ResearchRequest, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ResearchClient::new()?;
//!     let request = ResearchRequest::builder("What ended the Bronze Age?").build()?;
//!
//!     let mut stream = client.stream_research(request).await?;
//!     while let Some(event) = stream.next_event().await {
//!         if let Some(text) = event?.text_delta() {
//!             print!("{}", text);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Polling
//!
//! ```ignore
//! let report = client
//!     .poll_research(request, |snapshot| {
//!         eprintln!("status: {}", snapshot.status);
//!     })
//!     .await?;
//! println!("{}", report.text);
//! ```
//!
//! ## Configuration
//!
//! ```ignore
//! use std::time::Duration;
//! use deepresearch::{ResearchClient, RetryPolicy};
//!
//! let client = ResearchClient::builder()
//!     .api_key("AIza...")
//!     .connect_timeout(Duration::from_secs(5))
//!     .retry_policy(RetryPolicy {
//!         max_retries: 5,
//!         ..RetryPolicy::default()
//!     })
//!     .build()?;
//! ```

mod client;
pub mod config;
mod error;
pub mod poll;
pub mod protocol;
pub mod report;
pub mod stream;
pub mod transport;
pub mod view;

pub use error::{Error, Result};

// Re-export the main client types at crate root
pub use client::{ClientBuilder, EventStream, InteractionClient, ResearchClient};

// Re-export commonly used config types at crate root
pub use config::{ClientConfig, ClientConfigBuilder, PollPolicy, RetryPolicy};

// Re-export commonly used protocol types at crate root
pub use protocol::{
    EventId, EventKind, InteractionEvent, InteractionId, InteractionSnapshot, InteractionStatus,
    ResearchRequest,
};

// Re-export the controller surfaces at crate root
pub use poll::{poll_until_done, FinalReport};
pub use stream::ResearchStream;
