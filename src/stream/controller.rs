//! The resilient event stream: one logical sequence over many connections.

use std::sync::Arc;

use futures::StreamExt;

use crate::client::{EventStream, InteractionClient};
use crate::error::{Error, Result};
use crate::protocol::{EventId, InteractionEvent, InteractionId};
use crate::stream::backoff::Backoff;

/// What the controller has learned about the interaction so far.
///
/// The identity is pinned by the first start event and never changes; the
/// cursor advances with every event that carries an `event_id`, including
/// events of kinds this client does not understand.
#[derive(Debug, Default)]
struct SessionState {
    interaction_id: Option<InteractionId>,
    last_event_id: Option<EventId>,
    is_complete: bool,
}

impl SessionState {
    fn observe(&mut self, event: &InteractionEvent) {
        if let Some(cursor) = &event.event_id {
            self.last_event_id = Some(cursor.clone());
        }
        if self.interaction_id.is_none() {
            if let Some(id) = event.interaction_id() {
                self.interaction_id = Some(id.clone());
            }
        }
        if event.is_terminal() {
            self.is_complete = true;
        }
    }
}

/// A single gap-free sequence of interaction events.
///
/// `ResearchStream` wraps the physical SSE connections behind one pull-based
/// interface. When a connection drops mid-research, the next call to
/// [`next_event`](Self::next_event) reconnects with the recorded cursor,
/// backing off exponentially between failed attempts. Callers see either
/// the uninterrupted event sequence or a single fatal error.
///
/// Faults before the interaction announces itself cannot be resumed and end
/// the stream with the fault. After a terminal event the remaining events
/// are delivered as they arrive and the stream ends with the connection,
/// even if that connection ends badly.
pub struct ResearchStream {
    client: Arc<dyn InteractionClient>,
    inner: Option<EventStream>,
    session: SessionState,
    backoff: Backoff,
    /// Whether `inner` is still the create-call stream. Faults on it enter
    /// the reconnect cycle without spending a retry or sleeping.
    on_initial_stream: bool,
    done: bool,
}

impl ResearchStream {
    pub(crate) fn new(
        client: Arc<dyn InteractionClient>,
        initial: EventStream,
        retry: crate::config::RetryPolicy,
    ) -> Self {
        Self {
            client,
            inner: Some(initial),
            session: SessionState::default(),
            backoff: Backoff::new(retry),
            on_initial_stream: true,
            done: false,
        }
    }

    /// The interaction this stream is following, once known.
    pub fn interaction_id(&self) -> Option<&InteractionId> {
        self.session.interaction_id.as_ref()
    }

    /// The resume cursor: id of the last event that carried one.
    pub fn last_event_id(&self) -> Option<&EventId> {
        self.session.last_event_id.as_ref()
    }

    /// Whether a terminal event has been observed.
    pub fn is_complete(&self) -> bool {
        self.session.is_complete
    }

    /// Pull the next event of the logical sequence.
    ///
    /// Returns `None` when the sequence is over: after the connection
    /// carrying a terminal event ends, or after a clean end with no
    /// interaction to resume. Returns `Some(Err(_))` exactly once, for a
    /// fault the controller cannot recover from; the stream is finished
    /// after that.
    pub async fn next_event(&mut self) -> Option<Result<InteractionEvent>> {
        loop {
            if self.done {
                return None;
            }

            if let Some(stream) = self.inner.as_mut() {
                match stream.next().await {
                    Some(Ok(event)) => {
                        self.session.observe(&event);
                        return Some(Ok(event));
                    }
                    Some(Err(e)) => {
                        self.inner = None;
                        if self.session.is_complete {
                            // The research already finished; a bad tail on
                            // the connection changes nothing.
                            tracing::debug!(error = %e, "stream error after terminal event; ignoring");
                            self.done = true;
                            return None;
                        }
                        if self.session.interaction_id.is_none() {
                            // Nothing to resume against.
                            self.done = true;
                            return Some(Err(e));
                        }
                        if !e.is_transport() {
                            self.done = true;
                            return Some(Err(e));
                        }
                        if self.on_initial_stream {
                            tracing::warn!(error = %e, "initial stream interrupted; attempting to resume");
                        } else if let Err(fatal) = self.note_transport_fault(e).await {
                            self.done = true;
                            return Some(Err(fatal));
                        }
                    }
                    None => {
                        self.inner = None;
                        if self.session.is_complete || self.session.interaction_id.is_none() {
                            self.done = true;
                            return None;
                        }
                        // The connection closed cleanly mid-research. The
                        // stream made progress, so the failure budget is
                        // restored before resuming.
                        tracing::debug!("stream ended before completion; resuming");
                        self.backoff.clear_failures();
                    }
                }
            }

            match self.try_resume().await {
                Ok(()) => {}
                Err(fatal) => {
                    self.done = true;
                    return Some(Err(fatal));
                }
            }
        }
    }

    /// Open the next physical stream for the current session.
    async fn try_resume(&mut self) -> Result<()> {
        // Only reachable with a known interaction.
        let Some(id) = self.session.interaction_id.clone() else {
            return Err(Error::protocol("resume attempted before interaction start"));
        };

        loop {
            tracing::debug!(
                interaction = %id,
                attempt = self.backoff.failures() + 1,
                "resuming event stream"
            );
            match self
                .client
                .resume(&id, self.session.last_event_id.as_ref())
                .await
            {
                Ok(stream) => {
                    self.backoff.reset_delay();
                    self.on_initial_stream = false;
                    self.inner = Some(stream);
                    return Ok(());
                }
                Err(e) if e.is_transport() => {
                    self.note_transport_fault(e).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Spend one reconnection attempt and wait out the backoff delay.
    ///
    /// Fails with [`Error::ReconnectExhausted`] once the attempt budget is
    /// spent.
    async fn note_transport_fault(&mut self, error: Error) -> Result<()> {
        match self.backoff.note_failure() {
            Some(delay) => {
                tracing::warn!(
                    error = %error,
                    retry_in_secs = delay.as_secs(),
                    "transport fault; backing off before resume"
                );
                tokio::time::sleep(delay).await;
                Ok(())
            }
            None => Err(Error::ReconnectExhausted {
                attempts: self.backoff.failures(),
                message: error.to_string(),
            }),
        }
    }

    /// Adapt this controller into a [`futures::Stream`].
    ///
    /// Useful for combinators; [`next_event`](Self::next_event) remains the
    /// primary interface.
    pub fn into_stream(self) -> impl futures::Stream<Item = Result<InteractionEvent>> + Send {
        futures::stream::unfold(self, |mut stream| async move {
            let item = stream.next_event().await?;
            Some((item, stream))
        })
    }
}

impl std::fmt::Debug for ResearchStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchStream")
            .field("session", &self.session)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
