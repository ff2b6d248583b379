//! Resilient event streaming.
//!
//! This module provides [`ResearchStream`], the stream a caller actually
//! consumes. One research run may span many physical connections; the
//! stream hides the seams.
//!
//! # Overview
//!
//! A deep-research interaction can run for tens of minutes, and the HTTP
//! connection carrying its events rarely survives that long. The stream
//! records the interaction id announced by the first event and the id of
//! the last event received, and when a connection drops it re-opens the
//! stream from that cursor. The service replays nothing the client already
//! saw, so consumers observe one gap-free sequence.
//!
//! # Example
//!
//! ```ignore
//! let mut stream = client.stream_research(request).await?;
//!
//! while let Some(event) = stream.next_event().await {
//!     let event = event?;
//!     if let Some(text) = event.text_delta() {
//!         print!("{}", text);
//!     }
//!     if event.is_terminal() {
//!         break;
//!     }
//! }
//! ```

mod backoff;
mod controller;

pub use controller::ResearchStream;
