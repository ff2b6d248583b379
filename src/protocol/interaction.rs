//! Interaction identity and status-snapshot types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::events::ErrorPayload;

/// Server-assigned identifier of an interaction.
///
/// Identifies the logical unit of work across however many physical
/// connections it takes to deliver it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionId(String);

impl InteractionId {
    /// Create an interaction id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InteractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InteractionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for InteractionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for InteractionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle status reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    /// Research is still running.
    InProgress,
    /// Research finished; outputs carry the report.
    Completed,
    /// The service gave up on the research.
    Failed,
    /// The interaction was cancelled server-side.
    Cancelled,
    /// The interaction is paused on an out-of-band action.
    RequiresAction,
    /// A status value this client does not know.
    #[serde(other)]
    Unknown,
}

impl InteractionStatus {
    /// Check if the interaction has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InteractionStatus::Completed
                | InteractionStatus::Failed
                | InteractionStatus::Cancelled
                | InteractionStatus::RequiresAction
        )
    }
}

impl fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InteractionStatus::InProgress => "in_progress",
            InteractionStatus::Completed => "completed",
            InteractionStatus::Failed => "failed",
            InteractionStatus::Cancelled => "cancelled",
            InteractionStatus::RequiresAction => "requires_action",
            InteractionStatus::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// One output item of an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    /// Report text.
    Text {
        /// The output text.
        #[serde(default)]
        text: String,
    },
    /// An output type this client does not render.
    #[serde(other)]
    Other,
}

impl OutputItem {
    /// Get the text if this is a text output.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutputItem::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Point-in-time view of an interaction from the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSnapshot {
    /// Server-assigned id.
    pub id: InteractionId,
    /// Current lifecycle status.
    pub status: InteractionStatus,
    /// Ordered outputs produced so far.
    #[serde(default)]
    pub outputs: Vec<OutputItem>,
    /// Service error details, populated when the status is failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl InteractionSnapshot {
    /// Concatenate all non-empty text outputs, in order.
    ///
    /// Returns `None` when the interaction produced no text at all, so a
    /// completed-but-empty result is distinguishable from an empty string
    /// delta.
    pub fn report_text(&self) -> Option<String> {
        let text: String = self
            .outputs
            .iter()
            .filter_map(OutputItem::as_text)
            .filter(|text| !text.is_empty())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}
