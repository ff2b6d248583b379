//! Integration tests for the polling controller using a mock API.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use deepresearch::{
    ClientConfig, Error, InteractionClient, InteractionStatus, PollPolicy, ResearchClient,
    ResearchRequest,
};

use common::{completed, failed, in_progress, with_status, MockClient};

fn client_with(mock: Arc<MockClient>, poll: PollPolicy) -> ResearchClient {
    let config = ClientConfig::builder()
        .api_key("test-key")
        .poll_policy(poll)
        .build()
        .expect("valid config");
    ResearchClient::with_api(config, mock as Arc<dyn InteractionClient>)
}

fn policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_secs(5),
        max_polls: 100,
        max_consecutive_failures: 3,
    }
}

fn request(input: &str) -> ResearchRequest {
    ResearchRequest::builder(input).build().expect("valid request")
}

#[tokio::test(start_paused = true)]
async fn polls_until_completed_and_concatenates_outputs() {
    let mock = Arc::new(
        MockClient::new()
            .on_create_background(in_progress("int_P"))
            .on_status(Ok(in_progress("int_P")))
            .on_status(Ok(completed("int_P", &["Part 1", "Part 2"]))),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let began = Instant::now();
    let mut observed = Vec::new();
    let report = client
        .poll_research(request("topic"), |snapshot| {
            observed.push(snapshot.status.to_string());
        })
        .await
        .unwrap();

    assert_eq!(report.text, "Part 1Part 2");
    assert_eq!(report.interaction_id.as_str(), "int_P");
    // Two polls, one interval-long sleep before each.
    assert_eq!(began.elapsed(), Duration::from_secs(10));
    assert_eq!(mock.status_checks(), 2);
    assert_eq!(observed, vec!["in_progress", "in_progress", "completed"]);
}

#[tokio::test(start_paused = true)]
async fn failed_research_reports_the_service_message() {
    let mock = Arc::new(
        MockClient::new()
            .on_create_background(in_progress("int_P"))
            .on_status(Ok(failed("int_P", "internal model error"))),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let err = client
        .poll_research(request("topic"), |_| {})
        .await
        .unwrap_err();

    match err {
        Error::ResearchFailed { message } => assert_eq!(message, "internal model error"),
        other => panic!("Expected ResearchFailed, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn cancelled_research_is_reported_as_such() {
    let mock = Arc::new(
        MockClient::new()
            .on_create_background(in_progress("int_P"))
            .on_status(Ok(with_status(
                "int_P",
                InteractionStatus::Cancelled,
            ))),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let err = client
        .poll_research(request("topic"), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ResearchCancelled));
}

#[tokio::test(start_paused = true)]
async fn requires_action_carries_the_interaction_id() {
    let mock = Arc::new(
        MockClient::new()
            .on_create_background(in_progress("int_P"))
            .on_status(Ok(with_status(
                "int_P",
                InteractionStatus::RequiresAction,
            ))),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let err = client
        .poll_research(request("topic"), |_| {})
        .await
        .unwrap_err();

    match err {
        Error::RequiresAction { interaction_id } => assert_eq!(interaction_id, "int_P"),
        other => panic!("Expected RequiresAction, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn completed_without_text_outputs_is_a_failure() {
    let mock = Arc::new(
        MockClient::new()
            .on_create_background(in_progress("int_P"))
            .on_status(Ok(completed("int_P", &[]))),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let err = client
        .poll_research(request("topic"), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoOutput));
}

#[tokio::test(start_paused = true)]
async fn polling_times_out_after_max_polls() {
    let mock = Arc::new(
        MockClient::new()
            .on_create_background(in_progress("int_P"))
            .on_status(Ok(in_progress("int_P")))
            .on_status(Ok(in_progress("int_P"))),
    );
    let client = client_with(
        Arc::clone(&mock),
        PollPolicy {
            max_polls: 2,
            ..policy()
        },
    );

    let err = client
        .poll_research(request("topic"), |_| {})
        .await
        .unwrap_err();

    match err {
        Error::PollTimeout { polls } => assert_eq!(polls, 2),
        other => panic!("Expected PollTimeout, got {other:?}"),
    }
    assert_eq!(mock.status_checks(), 2);
}

#[tokio::test(start_paused = true)]
async fn transient_status_faults_are_tolerated() {
    // Two failed checks in a row stay under the limit of three; a
    // successful check restores the full tolerance.
    let mock = Arc::new(
        MockClient::new()
            .on_create_background(in_progress("int_P"))
            .on_status(Err(Error::transport("timeout")))
            .on_status(Err(Error::transport("timeout")))
            .on_status(Ok(in_progress("int_P")))
            .on_status(Err(Error::transport("timeout")))
            .on_status(Err(Error::transport("timeout")))
            .on_status(Ok(completed("int_P", &["Report"]))),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let report = client.poll_research(request("topic"), |_| {}).await.unwrap();
    assert_eq!(report.text, "Report");
    assert_eq!(mock.status_checks(), 6);
}

#[tokio::test(start_paused = true)]
async fn non_transport_status_errors_propagate_immediately() {
    // Retrying only makes sense for connectivity faults; a malformed
    // snapshot would fail the same way every time.
    let mock = Arc::new(
        MockClient::new()
            .on_create_background(in_progress("int_P"))
            .on_status(Err(Error::protocol("garbled snapshot"))),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let err = client
        .poll_research(request("topic"), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Protocol { .. }));
    assert_eq!(mock.status_checks(), 1, "no retry for a non-transport error");
}

#[tokio::test(start_paused = true)]
async fn terminal_initial_status_is_handled_without_polling() {
    // An interaction can be dead on arrival; the first snapshot already
    // says so, and no interval sleep or status check should happen.
    let mock = Arc::new(
        MockClient::new().on_create_background(failed("int_P", "invalid previous interaction")),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let began = Instant::now();
    let err = client
        .poll_research(request("topic"), |_| {})
        .await
        .unwrap_err();

    match err {
        Error::ResearchFailed { message } => {
            assert_eq!(message, "invalid previous interaction");
        }
        other => panic!("Expected ResearchFailed, got {other:?}"),
    }
    assert_eq!(began.elapsed(), Duration::ZERO);
    assert_eq!(mock.status_checks(), 0);
}

#[tokio::test(start_paused = true)]
async fn completed_at_creation_returns_the_report_immediately() {
    let mock = Arc::new(
        MockClient::new().on_create_background(completed("int_P", &["Already done"])),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let report = client.poll_research(request("topic"), |_| {}).await.unwrap();
    assert_eq!(report.text, "Already done");
    assert_eq!(mock.status_checks(), 0);
}

#[tokio::test(start_paused = true)]
async fn too_many_consecutive_faults_propagate() {
    let mock = Arc::new(
        MockClient::new()
            .on_create_background(in_progress("int_P"))
            .on_status(Err(Error::transport("timeout")))
            .on_status(Err(Error::transport("timeout")))
            .on_status(Err(Error::transport("unreachable"))),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let err = client
        .poll_research(request("topic"), |_| {})
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().contains("unreachable"), "the last fault wins");
    assert_eq!(mock.status_checks(), 3);
}

#[tokio::test(start_paused = true)]
async fn create_failure_propagates_before_any_poll() {
    let mock = Arc::new(
        MockClient::new().on_create_background_error(Error::Api {
            status: 429,
            message: "quota".into(),
        }),
    );
    let client = client_with(Arc::clone(&mock), policy());

    let err = client
        .poll_research(request("topic"), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 429, .. }));
    assert_eq!(mock.status_checks(), 0);
}

#[tokio::test(start_paused = true)]
async fn background_create_body_disables_streaming() {
    let mock = Arc::new(
        MockClient::new()
            .on_create_background(in_progress("int_P"))
            .on_status(Ok(completed("int_P", &["Report"]))),
    );
    let client = client_with(Arc::clone(&mock), policy());

    client.poll_research(request("topic"), |_| {}).await.unwrap();

    let bodies = mock.create_bodies();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["stream"], serde_json::json!(false));
    assert_eq!(bodies[0]["background"], serde_json::json!(true));
}
