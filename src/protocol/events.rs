//! Wire event types for the interaction event stream.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::interaction::InteractionId;

/// One event from an interaction event stream.
///
/// Events arrive as SSE frames whose data is a JSON object tagged by
/// `event_type`. Every event may carry an `event_id`; the most recently
/// observed one is the cursor a resume call replays from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Server-assigned resume cursor. Not present on every event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    /// The event payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

impl InteractionEvent {
    /// Check if this event ends the logical sequence.
    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    /// The interaction this event announced, for start events.
    pub fn interaction_id(&self) -> Option<&InteractionId> {
        self.kind.interaction_id()
    }

    /// Report text carried by this event, for text delta events.
    pub fn text_delta(&self) -> Option<&str> {
        self.kind.text_delta()
    }

    /// Reasoning summary carried by this event, for thought deltas.
    pub fn thought_summary(&self) -> Option<&str> {
        self.kind.thought_summary()
    }

    /// The error payload, for service error events.
    pub fn as_error(&self) -> Option<&ErrorPayload> {
        self.kind.as_error()
    }
}

/// Event payload, discriminated by the wire `event_type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum EventKind {
    /// First event of a logical interaction; announces its id.
    #[serde(rename = "interaction.start")]
    InteractionStart {
        /// The interaction being started.
        interaction: InteractionRef,
    },
    /// Incremental content: report text or a thought summary.
    #[serde(rename = "content.delta")]
    ContentDelta {
        /// The delta payload.
        delta: ContentDelta,
    },
    /// Terminal event: the research finished and the report is complete.
    #[serde(rename = "interaction.complete")]
    InteractionComplete,
    /// Terminal event: the service reported a failure in-band.
    ///
    /// This is a service-level error, not a transport fault; it never
    /// triggers a resume.
    #[serde(rename = "error")]
    Error {
        /// Error details.
        error: ErrorPayload,
    },
    /// An event type this client does not know. Forwarded unchanged so
    /// its cursor still advances the resume point.
    #[serde(other)]
    Other,
}

impl EventKind {
    /// Check if this event kind ends the logical sequence.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventKind::InteractionComplete | EventKind::Error { .. })
    }

    /// Get the interaction id if this is a start event.
    pub fn interaction_id(&self) -> Option<&InteractionId> {
        match self {
            EventKind::InteractionStart { interaction } => Some(&interaction.id),
            _ => None,
        }
    }

    /// Extract the text fragment from a text delta.
    pub fn text_delta(&self) -> Option<&str> {
        match self {
            EventKind::ContentDelta { delta } => delta.as_text(),
            _ => None,
        }
    }

    /// Extract the summary text from a thought-summary delta.
    pub fn thought_summary(&self) -> Option<&str> {
        match self {
            EventKind::ContentDelta { delta } => delta.as_thought_summary(),
            _ => None,
        }
    }

    /// Get the error details if this is an error event.
    pub fn as_error(&self) -> Option<&ErrorPayload> {
        match self {
            EventKind::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// Interaction identity carried by a start event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRef {
    /// Server-assigned interaction id.
    pub id: InteractionId,
}

/// Delta payload of a `content.delta` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentDelta {
    /// A fragment of the report text.
    Text {
        /// The text fragment.
        text: String,
    },
    /// A fragment of the model's running thought summary.
    ///
    /// The wire nests the text one level deeper than plain text deltas.
    ThoughtSummary {
        /// Wrapper carrying the summary text.
        content: ThoughtContent,
    },
    /// A delta type this client does not render.
    #[serde(other)]
    Other,
}

impl ContentDelta {
    /// Get the text if this is a text delta.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentDelta::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Get the summary text if this is a thought-summary delta.
    pub fn as_thought_summary(&self) -> Option<&str> {
        match self {
            ContentDelta::ThoughtSummary { content } => Some(&content.text),
            _ => None,
        }
    }
}

/// Nested text carrier for thought-summary deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtContent {
    /// The summary text.
    #[serde(default)]
    pub text: String,
}

/// Service-reported error details.
///
/// Carried by `error` events and by failed interaction snapshots. All
/// fields are optional on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Numeric error code, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Service status string, e.g. "INVALID_ARGUMENT".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, &self.status) {
            (Some(message), _) => write!(f, "{message}"),
            (None, Some(status)) => write!(f, "{status}"),
            (None, None) => match self.code {
                Some(code) => write!(f, "error code {code}"),
                None => write!(f, "unspecified error"),
            },
        }
    }
}

/// Opaque resume cursor assigned by the server.
///
/// Compared only for identity; the client never assumes ordering beyond
/// "replay from after this cursor".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create an event id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
