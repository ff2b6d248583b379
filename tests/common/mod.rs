//! Test utilities for deepresearch integration tests.

// Each test binary compiles this module; not all of them use every helper.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;

use deepresearch::protocol::{
    ContentDelta, ErrorPayload, EventId, EventKind, InteractionEvent, InteractionId,
    InteractionRef, InteractionSnapshot, InteractionStatus, OutputItem, ResearchRequest,
    ThoughtContent,
};
use deepresearch::{Error, EventStream, InteractionClient, Result};

/// One scripted physical stream: items to replay in order, or an error
/// raised at open time.
type ScriptedStream = Result<Vec<Result<InteractionEvent>>>;

/// A mock API client that replays scripted responses.
///
/// Each `create` or `resume` call consumes the next scripted stream from
/// its queue; each `create_background` or `get_status` call consumes the
/// next scripted snapshot. Calls are recorded so tests can assert on
/// request bodies, reconnect cursors, and poll counts.
pub struct MockClient {
    create_streams: Mutex<VecDeque<ScriptedStream>>,
    resume_streams: Mutex<VecDeque<ScriptedStream>>,
    created: Mutex<VecDeque<Result<InteractionSnapshot>>>,
    statuses: Mutex<VecDeque<Result<InteractionSnapshot>>>,
    log: Mutex<CallLog>,
}

#[derive(Default)]
struct CallLog {
    create_bodies: Vec<Value>,
    resumes: Vec<(String, Option<String>)>,
    status_checks: Vec<String>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            create_streams: Mutex::new(VecDeque::new()),
            resume_streams: Mutex::new(VecDeque::new()),
            created: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            log: Mutex::new(CallLog::default()),
        }
    }

    /// Script the stream returned by the next `create` call.
    pub fn on_create(self, items: Vec<Result<InteractionEvent>>) -> Self {
        self.create_streams.lock().unwrap().push_back(Ok(items));
        self
    }

    /// Make the next `create` call fail at open time.
    pub fn on_create_error(self, error: Error) -> Self {
        self.create_streams.lock().unwrap().push_back(Err(error));
        self
    }

    /// Script the stream returned by the next `resume` call.
    pub fn on_resume(self, items: Vec<Result<InteractionEvent>>) -> Self {
        self.resume_streams.lock().unwrap().push_back(Ok(items));
        self
    }

    /// Make the next `resume` call fail at open time.
    pub fn on_resume_error(self, error: Error) -> Self {
        self.resume_streams.lock().unwrap().push_back(Err(error));
        self
    }

    /// Script the snapshot returned by the next `create_background` call.
    pub fn on_create_background(self, snapshot: InteractionSnapshot) -> Self {
        self.created.lock().unwrap().push_back(Ok(snapshot));
        self
    }

    /// Make the next `create_background` call fail.
    pub fn on_create_background_error(self, error: Error) -> Self {
        self.created.lock().unwrap().push_back(Err(error));
        self
    }

    /// Script the result of the next `get_status` call.
    pub fn on_status(self, result: Result<InteractionSnapshot>) -> Self {
        self.statuses.lock().unwrap().push_back(result);
        self
    }

    /// Number of `create` / `create_background` calls observed.
    pub fn create_calls(&self) -> usize {
        self.log.lock().unwrap().create_bodies.len()
    }

    /// Wire body of each observed create call.
    pub fn create_bodies(&self) -> Vec<Value> {
        self.log.lock().unwrap().create_bodies.clone()
    }

    /// The `(interaction id, cursor)` pair of each observed `resume` call.
    pub fn resume_calls(&self) -> Vec<(String, Option<String>)> {
        self.log.lock().unwrap().resumes.clone()
    }

    /// Number of `get_status` calls observed.
    pub fn status_checks(&self) -> usize {
        self.log.lock().unwrap().status_checks.len()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InteractionClient for MockClient {
    async fn create(&self, request: &ResearchRequest) -> Result<EventStream> {
        self.log
            .lock()
            .unwrap()
            .create_bodies
            .push(request.to_body(true));
        let scripted = self
            .create_streams
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted create call");
        scripted.map(|items| stream::iter(items).boxed())
    }

    async fn create_background(&self, request: &ResearchRequest) -> Result<InteractionSnapshot> {
        self.log
            .lock()
            .unwrap()
            .create_bodies
            .push(request.to_body(false));
        self.created
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted create_background call")
    }

    async fn resume(
        &self,
        id: &InteractionId,
        last_event_id: Option<&EventId>,
    ) -> Result<EventStream> {
        self.log
            .lock()
            .unwrap()
            .resumes
            .push((id.to_string(), last_event_id.map(ToString::to_string)));
        let scripted = self
            .resume_streams
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted resume call");
        scripted.map(|items| stream::iter(items).boxed())
    }

    async fn get_status(&self, id: &InteractionId) -> Result<InteractionSnapshot> {
        self.log.lock().unwrap().status_checks.push(id.to_string());
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted get_status call")
    }
}

/// Builder for one physical stream's scripted event sequence.
///
/// Event ids are assigned automatically as `ev_1`, `ev_2`, ... so a
/// stream served after a resume can continue the numbering with
/// [`ScenarioBuilder::starting_at`].
pub struct ScenarioBuilder {
    items: Vec<Result<InteractionEvent>>,
    interaction_id: String,
    seq: u32,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            interaction_id: "int_research_1".to_string(),
            seq: 1,
        }
    }

    /// Continue event-id numbering from a later sequence number.
    pub fn starting_at(seq: u32) -> Self {
        Self {
            seq,
            ..Self::new()
        }
    }

    /// Set the interaction id announced by the start event.
    pub fn interaction_id(mut self, id: &str) -> Self {
        self.interaction_id = id.to_string();
        self
    }

    /// Append the interaction start event.
    pub fn start(self) -> Self {
        let interaction = InteractionRef {
            id: InteractionId::from(self.interaction_id.as_str()),
        };
        self.event(EventKind::InteractionStart { interaction })
    }

    /// Append a report text delta.
    pub fn text(self, text: &str) -> Self {
        self.event(EventKind::ContentDelta {
            delta: ContentDelta::Text {
                text: text.to_string(),
            },
        })
    }

    /// Append a thought-summary delta.
    pub fn thought(self, text: &str) -> Self {
        self.event(EventKind::ContentDelta {
            delta: ContentDelta::ThoughtSummary {
                content: ThoughtContent {
                    text: text.to_string(),
                },
            },
        })
    }

    /// Append an event of a kind this client does not know.
    pub fn unknown(self) -> Self {
        self.event(EventKind::Other)
    }

    /// Append a text delta that carries no event id.
    pub fn text_without_id(mut self, text: &str) -> Self {
        self.items.push(Ok(InteractionEvent {
            event_id: None,
            kind: EventKind::ContentDelta {
                delta: ContentDelta::Text {
                    text: text.to_string(),
                },
            },
        }));
        self
    }

    /// Append the interaction complete event.
    pub fn complete(self) -> Self {
        self.event(EventKind::InteractionComplete)
    }

    /// Append an in-band service error event.
    pub fn service_error(self, message: &str) -> Self {
        self.event(EventKind::Error {
            error: ErrorPayload {
                message: Some(message.to_string()),
                ..ErrorPayload::default()
            },
        })
    }

    /// Append a mid-stream transport fault.
    pub fn transport_fault(mut self, message: &str) -> Self {
        self.items.push(Err(Error::transport(message)));
        self
    }

    /// Append an arbitrary error item.
    pub fn fault(mut self, error: Error) -> Self {
        self.items.push(Err(error));
        self
    }

    pub fn build(self) -> Vec<Result<InteractionEvent>> {
        self.items
    }

    fn event(mut self, kind: EventKind) -> Self {
        let event_id = EventId::from(format!("ev_{}", self.seq));
        self.seq += 1;
        self.items.push(Ok(InteractionEvent {
            event_id: Some(event_id),
            kind,
        }));
        self
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An in-progress snapshot for polling scenarios.
pub fn in_progress(id: &str) -> InteractionSnapshot {
    InteractionSnapshot {
        id: InteractionId::from(id),
        status: InteractionStatus::InProgress,
        outputs: Vec::new(),
        error: None,
    }
}

/// A completed snapshot whose report is the given text parts, in order.
pub fn completed(id: &str, parts: &[&str]) -> InteractionSnapshot {
    InteractionSnapshot {
        id: InteractionId::from(id),
        status: InteractionStatus::Completed,
        outputs: parts
            .iter()
            .map(|text| OutputItem::Text {
                text: (*text).to_string(),
            })
            .collect(),
        error: None,
    }
}

/// A failed snapshot carrying a service error message.
pub fn failed(id: &str, message: &str) -> InteractionSnapshot {
    InteractionSnapshot {
        id: InteractionId::from(id),
        status: InteractionStatus::Failed,
        outputs: Vec::new(),
        error: Some(ErrorPayload {
            message: Some(message.to_string()),
            ..ErrorPayload::default()
        }),
    }
}

/// A snapshot with an arbitrary status and no outputs.
pub fn with_status(id: &str, status: InteractionStatus) -> InteractionSnapshot {
    InteractionSnapshot {
        id: InteractionId::from(id),
        status,
        outputs: Vec::new(),
        error: None,
    }
}
