/// Errors that can occur when using deepresearch.
///
/// Errors are organized by category:
/// - Configuration errors: detected before any network activity
/// - Transport faults: connectivity failures, retryable mid-stream
/// - Service errors: failures reported by the remote API
/// - Protocol errors: unexpected or malformed wire data
/// - Outcome errors: terminal interaction states other than success
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration errors (detected before any network activity)
    // -------------------------------------------------------------------------
    /// No API key available from the builder or the environment.
    #[error("GEMINI_API_KEY is not set and no API key was configured")]
    MissingApiKey,

    /// Invalid configuration provided to a builder or CLI flag.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -------------------------------------------------------------------------
    // Transport faults (connectivity level)
    // -------------------------------------------------------------------------
    /// Connectivity failure: refused, dropped, timed out, or the response
    /// body was cut short. Recoverable mid-stream via resume.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Every reconnection attempt within the retry budget failed.
    #[error("failed to reconnect after {attempts} attempts: {message}")]
    ReconnectExhausted { attempts: u32, message: String },

    // -------------------------------------------------------------------------
    // Service errors (reported by the remote API)
    // -------------------------------------------------------------------------
    /// Non-success HTTP response from the API.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The service reported the research as failed.
    #[error("research failed: {message}")]
    ResearchFailed { message: String },

    /// The interaction was cancelled on the service side.
    #[error("research was cancelled")]
    ResearchCancelled,

    /// The interaction is paused waiting for an out-of-band action.
    ///
    /// Carries the interaction id so the caller can follow up with
    /// `--previous-interaction-id` once the action is resolved.
    #[error("research requires action (interaction id: {interaction_id})")]
    RequiresAction { interaction_id: String },

    /// The interaction completed but produced no text outputs.
    #[error("research completed but no text output was received")]
    NoOutput,

    // -------------------------------------------------------------------------
    // Protocol errors
    // -------------------------------------------------------------------------
    /// Malformed event or snapshot data from the wire.
    #[error("protocol error: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // -------------------------------------------------------------------------
    // IO errors
    // -------------------------------------------------------------------------
    /// Local file I/O failure, wrapped with the offending path.
    #[error("{message}: {source}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Polling errors
    // -------------------------------------------------------------------------
    /// The polling loop hit its iteration ceiling before a terminal status.
    #[error("research timed out after {polls} status polls")]
    PollTimeout { polls: u32 },
}

/// A specialized Result type for deepresearch operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a transport fault from a plain message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a protocol error from a plain message.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            source: None,
        }
    }

    /// Create a protocol error for a JSON payload that failed to parse.
    pub fn event_parse(source: serde_json::Error, raw: &str) -> Self {
        Self::Protocol {
            message: format!(
                "invalid event JSON ({}): {}",
                source,
                raw.chars().take(100).collect::<String>()
            ),
            source: Some(source),
        }
    }

    /// Create an invalid-configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create an I/O error for a failed read, naming the path.
    pub fn read_failed(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            message: format!("cannot read '{}'", path.as_ref().display()),
            source,
        }
    }

    /// Create an I/O error for a failed write, naming the path.
    pub fn write_failed(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            message: format!("cannot write to '{}'", path.as_ref().display()),
            source,
        }
    }

    /// Check whether this error is a connectivity-level fault that the
    /// stream controller may recover from by resuming.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Protocol {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Error::Api {
                status: status.as_u16(),
                message: err.without_url().to_string(),
            };
        }
        if err.is_decode() {
            return Error::protocol(err.without_url().to_string());
        }
        // Connect, timeout, request and body faults are all connectivity.
        Error::Transport {
            message: err.without_url().to_string(),
        }
    }
}
