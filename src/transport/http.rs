//! HTTP implementation of the interactions API.
//!
//! Maps the [`InteractionClient`] operations onto the service's REST
//! surface: interactions are created with a POST and re-opened or inspected
//! with GETs, with streaming negotiated through `alt=sse`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::RequestBuilder;

use crate::client::{EventStream, InteractionClient};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::protocol::{EventId, InteractionId, InteractionSnapshot, ResearchRequest};
use crate::transport::sse;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// [`InteractionClient`] backed by the real service over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpInteractionClient {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
}

impl HttpInteractionClient {
    /// Build the HTTP client for the given configuration.
    ///
    /// Only connection establishment is bounded by a timeout. Requests
    /// themselves stay open as long as the service keeps streaming, which
    /// for deep research can be tens of minutes.
    pub fn new(config: Arc<ClientConfig>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self { config, http })
    }

    fn interactions_url(&self) -> String {
        format!("{}/interactions", self.config.base_url())
    }

    fn interaction_url(&self, id: &InteractionId) -> String {
        format!("{}/interactions/{}", self.config.base_url(), id.as_str())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(API_KEY_HEADER, &self.config.api_key)
    }

    /// Send a request expected to answer with an SSE body.
    async fn open_stream(&self, request: RequestBuilder) -> Result<EventStream> {
        let response = check_status(request.send().await?).await?;
        Ok(sse::event_stream(Box::pin(response.bytes_stream())))
    }
}

#[async_trait]
impl InteractionClient for HttpInteractionClient {
    async fn create(&self, request: &ResearchRequest) -> Result<EventStream> {
        tracing::debug!(url = %self.interactions_url(), "creating streaming interaction");
        let http_request = self
            .authorized(self.http.post(self.interactions_url()))
            .query(&[("alt", "sse")])
            .json(&request.to_body(true));

        self.open_stream(http_request).await
    }

    async fn create_background(&self, request: &ResearchRequest) -> Result<InteractionSnapshot> {
        tracing::debug!(url = %self.interactions_url(), "creating background interaction");
        let http_request = self
            .authorized(self.http.post(self.interactions_url()))
            .json(&request.to_body(false));

        let response = check_status(http_request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn resume(
        &self,
        id: &InteractionId,
        last_event_id: Option<&EventId>,
    ) -> Result<EventStream> {
        tracing::debug!(
            interaction = %id,
            cursor = last_event_id.map(|e| e.as_str()).unwrap_or("<none>"),
            "resuming event stream"
        );
        let http_request = self
            .authorized(self.http.get(self.interaction_url(id)))
            .query(&resume_query(last_event_id));

        self.open_stream(http_request).await
    }

    async fn get_status(&self, id: &InteractionId) -> Result<InteractionSnapshot> {
        tracing::debug!(interaction = %id, "fetching interaction status");
        let http_request = self.authorized(self.http.get(self.interaction_url(id)));

        let response = check_status(http_request.send().await?).await?;
        Ok(response.json().await?)
    }
}

fn resume_query(last_event_id: Option<&EventId>) -> Vec<(&'static str, String)> {
    let mut query = vec![("alt", "sse".to_string())];
    if let Some(cursor) = last_event_id {
        query.push(("last_event_id", cursor.as_str().to_string()));
    }
    query
}

/// Turn a non-2xx response into an API error carrying the body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(Error::Api {
        status: status.as_u16(),
        message: body.trim().to_string(),
    })
}
