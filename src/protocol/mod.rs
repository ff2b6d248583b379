//! JSON protocol types for the interactions API.
//!
//! This module defines the wire shapes exchanged with the service: the
//! events carried by the SSE stream, the snapshot returned by the status
//! endpoint, and the request body sent to the create endpoint.
//!
//! # Event Stream
//!
//! A streamed interaction delivers JSON events of these kinds:
//!
//! - `interaction.start`: announces the interaction id used for resuming
//! - `content.delta`: a report-text or thought-summary fragment
//! - `interaction.complete`: terminal, research finished
//! - `error`: terminal, service-reported failure
//!
//! # Example
//!
//! ```
//! use deepresearch::protocol::{EventKind, InteractionEvent};
//!
//! let json = r#"{"event_type": "content.delta", "event_id": "ev_1", "delta": {"type": "text", "text": "Hello"}}"#;
//! let event: InteractionEvent = serde_json::from_str(json).unwrap();
//!
//! assert_eq!(event.kind.text_delta(), Some("Hello"));
//! ```

mod events;
mod interaction;
mod request;

// Re-export all public types
pub use events::{
    ContentDelta, ErrorPayload, EventId, EventKind, InteractionEvent, InteractionRef,
    ThoughtContent,
};
pub use interaction::{InteractionId, InteractionSnapshot, InteractionStatus, OutputItem};
pub use request::{
    AgentConfig, DEFAULT_AGENT, FileSearchStore, ResearchRequest, ResearchRequestBuilder,
    ResearchTarget, ToolSpec,
};
