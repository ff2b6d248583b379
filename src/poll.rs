//! Polling mode: background research followed by periodic status checks.
//!
//! The streaming mode in [`crate::stream`] is the richer way to follow a
//! research run, but some environments cannot hold a connection open for
//! the duration of one. Polling trades the live event feed for a simple
//! fetch-on-interval loop that only needs short-lived requests.

use crate::client::InteractionClient;
use crate::config::PollPolicy;
use crate::error::{Error, Result};
use crate::protocol::{InteractionId, InteractionSnapshot, InteractionStatus, ResearchRequest};

/// The outcome of a research run that finished with output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalReport {
    /// The interaction that produced the report.
    pub interaction_id: InteractionId,
    /// The report text, with multiple output items concatenated in order.
    pub text: String,
}

/// Run a research request in the background and poll it to completion.
///
/// The interaction is created without streaming, then its status is fetched
/// once per interval until it reaches a terminal state or the polling
/// window closes. Up to `max_consecutive_failures - 1` transport-failed
/// checks in a row are tolerated; a successful check restores the full
/// tolerance. Other check failures, such as an API rejection or a malformed
/// snapshot, propagate immediately.
///
/// `on_status` is called with every snapshot obtained, starting with the
/// one returned by creation.
///
/// # Errors
///
/// - [`Error::ResearchFailed`], [`Error::ResearchCancelled`] or
///   [`Error::RequiresAction`] when the interaction ends in that state
/// - [`Error::NoOutput`] when it completes without any report text
/// - [`Error::PollTimeout`] when the polling window closes first
/// - the last transport fault, when too many checks fail in a row
/// - any non-transport status-check error, immediately
pub async fn poll_until_done(
    api: &dyn InteractionClient,
    policy: PollPolicy,
    request: &ResearchRequest,
    mut on_status: impl FnMut(&InteractionSnapshot),
) -> Result<FinalReport> {
    let created = api.create_background(request).await?;
    let id = created.id.clone();
    tracing::info!(interaction = %id, "background research started");
    on_status(&created);

    // The interaction can already be terminal at creation, for example a
    // follow-up against an id the service rejects.
    if let Some(outcome) = check_outcome(&created) {
        return outcome;
    }

    let mut polls: u32 = 0;
    let mut consecutive_failures: u32 = 0;

    while polls < policy.max_polls {
        tokio::time::sleep(policy.interval).await;
        polls += 1;

        let snapshot = match api.get_status(&id).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_transport() => {
                consecutive_failures += 1;
                if consecutive_failures >= policy.max_consecutive_failures {
                    return Err(e);
                }
                tracing::warn!(
                    error = %e,
                    consecutive_failures,
                    "status check failed; will poll again"
                );
                continue;
            }
            // Only connectivity faults are worth re-asking about.
            Err(e) => return Err(e),
        };
        consecutive_failures = 0;
        on_status(&snapshot);

        if let Some(outcome) = check_outcome(&snapshot) {
            return outcome;
        }
    }

    Err(Error::PollTimeout { polls })
}

/// Map a snapshot to a final outcome, or `None` while the research is
/// still running.
fn check_outcome(snapshot: &InteractionSnapshot) -> Option<Result<FinalReport>> {
    match snapshot.status {
        InteractionStatus::InProgress => None,
        InteractionStatus::Completed => Some(match snapshot.report_text() {
            Some(text) => Ok(FinalReport {
                interaction_id: snapshot.id.clone(),
                text,
            }),
            None => Err(Error::NoOutput),
        }),
        InteractionStatus::Failed => Some(Err(Error::ResearchFailed {
            message: snapshot
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string()),
        })),
        InteractionStatus::Cancelled => Some(Err(Error::ResearchCancelled)),
        InteractionStatus::RequiresAction => Some(Err(Error::RequiresAction {
            interaction_id: snapshot.id.to_string(),
        })),
        InteractionStatus::Unknown => Some(Err(Error::protocol(format!(
            "interaction {} reported an unrecognized status",
            snapshot.id
        )))),
    }
}
