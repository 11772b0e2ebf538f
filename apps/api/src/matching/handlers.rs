//! Axum route handlers for the Matching API.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::errors::AppError;
use crate::matching::models::{CandidateProfile, JobPosting, MatchEvent, MatchOutcome, MatchReport};
use crate::state::AppState;

/// Progress snapshots buffered per streaming request.
const PROGRESS_BUFFER: usize = 16;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub candidate: CandidateProfile,
    pub jobs: Vec<JobPosting>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressPayload<'a> {
    completed_batches: usize,
    total_batches: usize,
    outcomes: &'a [MatchOutcome],
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matches
///
/// Scores the candidate against every posting and returns the ranked report.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchReport>, AppError> {
    let report = state
        .matcher
        .run(request.candidate, request.jobs, None)
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/matches/stream
///
/// Same as `handle_match`, but streams `progress` events between waves and a
/// final `completed` event. Fatal input/configuration errors arrive as one
/// `error` event carrying the usual JSON error envelope.
pub async fn handle_match_stream(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel(PROGRESS_BUFFER);
    let matcher = state.matcher.clone();
    let run = tokio::spawn(async move {
        matcher
            .run(request.candidate, request.jobs, Some(tx))
            .await
    });

    let events = stream::unfold((rx, Some(run)), |(mut rx, run)| async move {
        if let Some(event) = rx.recv().await {
            return Some((Ok(to_sse_event(&event)), (rx, run)));
        }

        // Channel closed: the run is over. Surface a fatal error if there was one.
        let outcome = run?.await;
        let failure = match outcome {
            Ok(Ok(_)) => return None,
            Ok(Err(err)) => AppError::from(err),
            Err(join_err) => AppError::Internal(anyhow::anyhow!("match run aborted: {join_err}")),
        };
        Some((Ok(error_event(&failure)), (rx, None)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: &MatchEvent) -> Event {
    let built = match event {
        MatchEvent::Progress {
            completed_batches,
            total_batches,
            outcomes,
        } => Event::default().event("progress").json_data(ProgressPayload {
            completed_batches: *completed_batches,
            total_batches: *total_batches,
            outcomes,
        }),
        MatchEvent::Completed(report) => Event::default().event("completed").json_data(report),
    };
    built.unwrap_or_else(|e| error_event(&AppError::Internal(anyhow::anyhow!(e))))
}

fn error_event(err: &AppError) -> Event {
    let (_, body) = err.body();
    Event::default().event("error").data(body.to_string())
}
