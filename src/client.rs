//! High-level research client for submitting and following interactions.
//!
//! This module provides [`ResearchClient`], the main entry point for running
//! deep-research requests. The client owns the configuration and the
//! transport, and hands out [`ResearchStream`]s that survive connection
//! drops by resuming from the last delivered event.
//!
//! # Example
//!
//! ```ignore
//! use deepresearch::{ResearchClient, ResearchRequest};
//!
//! let client = ResearchClient::new()?;
//! let request =
//!     ResearchRequest::builder("Research the history of the Antikythera mechanism").build()?;
//!
//! let mut stream = client.stream_research(request).await?;
//! while let Some(event) = stream.next_event().await {
//!     println!("{:?}", event?);
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::{ClientConfig, ClientConfigBuilder, PollPolicy, RetryPolicy};
use crate::error::Result;
use crate::poll::{self, FinalReport};
use crate::protocol::{
    EventId, InteractionEvent, InteractionId, InteractionSnapshot, ResearchRequest,
};
use crate::stream::ResearchStream;
use crate::transport::HttpInteractionClient;

/// One physical event stream, as delivered by a single connection.
///
/// Streams of this type end when the connection ends; they do not reconnect.
/// [`ResearchStream`] stitches several of them into one logical stream.
pub type EventStream = BoxStream<'static, Result<InteractionEvent>>;

/// The operations the research controllers need from the interactions API.
///
/// The production implementation is [`HttpInteractionClient`]; tests
/// substitute scripted implementations to drive reconnect and polling
/// behavior without a network.
#[async_trait]
pub trait InteractionClient: Send + Sync {
    /// Create an interaction and open its event stream.
    async fn create(&self, request: &ResearchRequest) -> Result<EventStream>;

    /// Create an interaction without streaming and return its first snapshot.
    async fn create_background(&self, request: &ResearchRequest) -> Result<InteractionSnapshot>;

    /// Reopen the event stream of an existing interaction.
    ///
    /// When `last_event_id` is set, the service replays only events after
    /// that cursor.
    async fn resume(
        &self,
        id: &InteractionId,
        last_event_id: Option<&EventId>,
    ) -> Result<EventStream>;

    /// Fetch the current snapshot of an interaction.
    async fn get_status(&self, id: &InteractionId) -> Result<InteractionSnapshot>;
}

/// Client for running deep-research interactions.
///
/// Create with [`ResearchClient::new`] for environment-based configuration,
/// [`ResearchClient::builder`] for custom settings, or
/// [`ResearchClient::with_config`] with a pre-built [`ClientConfig`].
///
/// The client is cheap to clone; clones share the configuration and the
/// underlying HTTP connection pool.
#[derive(Clone)]
pub struct ResearchClient {
    config: Arc<ClientConfig>,
    api: Arc<dyn InteractionClient>,
}

impl ResearchClient {
    /// Create a client configured from the environment.
    ///
    /// Reads the API key from `GEMINI_API_KEY` and the endpoint from
    /// `GEMINI_BASE_URL` when set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`](crate::Error::MissingApiKey) if no
    /// API key is available.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a client with the given configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let config = Arc::new(config);
        let api = HttpInteractionClient::new(Arc::clone(&config))?;

        Ok(Self {
            config,
            api: Arc::new(api),
        })
    }

    /// Create a client that speaks to a custom API implementation.
    ///
    /// This is the seam used by tests to script stream and snapshot
    /// sequences; production code goes through [`ResearchClient::new`].
    pub fn with_api(config: ClientConfig, api: Arc<dyn InteractionClient>) -> Self {
        Self {
            config: Arc::new(config),
            api,
        }
    }

    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Submit a research request and follow its event stream.
    ///
    /// The returned [`ResearchStream`] presents a single gap-free sequence
    /// of events. When a connection drops mid-research it reconnects with
    /// the recorded cursor and backs off between attempts, so callers only
    /// see a failure once reconnection is hopeless.
    ///
    /// # Errors
    ///
    /// Returns an error if the interaction cannot be created at all. Faults
    /// after creation surface through the stream itself.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut stream = client.stream_research(request).await?;
    /// while let Some(event) = stream.next_event().await {
    ///     match event? {
    ///         event if event.is_terminal() => break,
    ///         event => println!("{:?}", event),
    ///     }
    /// }
    /// ```
    pub async fn stream_research(&self, request: ResearchRequest) -> Result<ResearchStream> {
        let initial = self.api.create(&request).await?;

        Ok(ResearchStream::new(
            Arc::clone(&self.api),
            initial,
            self.config.retry(),
        ))
    }

    /// Submit a research request and poll until it finishes.
    ///
    /// This is the non-streaming mode: the interaction runs in the
    /// background and the client checks its status on a fixed interval,
    /// tolerating a bounded run of transport-failed checks. `on_status` is invoked
    /// with every snapshot that was fetched successfully.
    ///
    /// # Errors
    ///
    /// Returns an error if the interaction fails, is cancelled, requires
    /// action, produces no text, or does not finish within the configured
    /// polling window.
    pub async fn poll_research(
        &self,
        request: ResearchRequest,
        on_status: impl FnMut(&InteractionSnapshot),
    ) -> Result<FinalReport> {
        poll::poll_until_done(self.api.as_ref(), self.config.poll(), &request, on_status).await
    }

    /// Get a reference to the client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl fmt::Debug for ResearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResearchClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ResearchClient`].
///
/// This wraps [`ClientConfigBuilder`] and builds directly into a client.
///
/// # Example
///
/// ```ignore
/// let client = ResearchClient::builder()
///     .api_key("AIza...")
///     .connect_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    inner: ClientConfigBuilder,
}

impl ClientBuilder {
    /// Create a new client builder with default settings.
    pub fn new() -> Self {
        Self {
            inner: ClientConfigBuilder::default(),
        }
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key can be resolved or the configured
    /// retry and polling policies are invalid.
    pub fn build(self) -> Result<ResearchClient> {
        let config = self.inner.build()?;
        ResearchClient::with_config(config)
    }

    // -------------------------------------------------------------------------
    // Endpoint and authentication (delegated to ClientConfigBuilder)
    // -------------------------------------------------------------------------

    /// Use this API key instead of reading `GEMINI_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.inner = self.inner.api_key(key);
        self
    }

    /// Override the service base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.base_url(url);
        self
    }

    /// Timeout for establishing connections.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.connect_timeout(timeout);
        self
    }

    // -------------------------------------------------------------------------
    // Retry and polling policies
    // -------------------------------------------------------------------------

    /// Reconnection policy for dropped event streams.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.retry_policy(retry);
        self
    }

    /// Polling policy for non-streaming research.
    pub fn poll_policy(mut self, poll: PollPolicy) -> Self {
        self.inner = self.inner.poll_policy(poll);
        self
    }
}
