//! Matching Orchestrator: the single entry point for "match candidate against catalog".
//!
//! Flow: validate inputs → scorer readiness → plan_batches → execute_batches →
//!       aggregate → report (and a final `Completed` event when a channel is given).
//!
//! Input and configuration problems abort before any network call. Everything
//! that goes wrong inside a batch is contained in that batch's summary.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::matching::aggregator::aggregate;
use crate::matching::executor::{execute_batches, DEFAULT_MAX_CONCURRENCY};
use crate::matching::models::{
    CandidateProfile, JobPosting, MatchEvent, MatchOutcome, MatchReport, MAX_SCORE,
};
use crate::matching::planner::{plan_batches, DEFAULT_BATCH_SIZE};
use crate::matching::scorer::{BatchScorer, ScoringError};
use crate::matching::MatchError;

/// Tunables for one orchestrator. Constant for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    pub batch_size: usize,
    pub max_concurrency: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl MatchSettings {
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.batch_size == 0 {
            return Err(MatchError::InvalidSettings(
                "batch size must be greater than zero".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(MatchError::InvalidSettings(
                "max concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct MatchingOrchestrator {
    scorer: Arc<dyn BatchScorer>,
    settings: MatchSettings,
}

impl MatchingOrchestrator {
    pub fn new(scorer: Arc<dyn BatchScorer>, settings: MatchSettings) -> Self {
        Self { scorer, settings }
    }

    /// Matches the candidate against the catalog and returns the ranked outcomes.
    ///
    /// Library-facing entry point for callers that only need the ranked list;
    /// the HTTP handlers use `run` for the per-batch report.
    pub async fn match_candidate(
        &self,
        candidate: CandidateProfile,
        jobs: Vec<JobPosting>,
        progress: Option<mpsc::Sender<MatchEvent>>,
    ) -> Result<Vec<MatchOutcome>, MatchError> {
        Ok(self.run(candidate, jobs, progress).await?.outcomes)
    }

    /// Runs one matching pass and returns the full report, including per-batch status.
    ///
    /// With a progress channel, `MatchEvent::Progress` snapshots arrive between
    /// waves and `MatchEvent::Completed` is always the last message.
    pub async fn run(
        &self,
        candidate: CandidateProfile,
        jobs: Vec<JobPosting>,
        progress: Option<mpsc::Sender<MatchEvent>>,
    ) -> Result<MatchReport, MatchError> {
        if jobs.is_empty() {
            return Err(MatchError::EmptyCatalog);
        }
        if candidate.is_blank() {
            return Err(MatchError::EmptyResume);
        }
        if let Some((field, value)) = candidate.out_of_range_score() {
            return Err(MatchError::InvalidProfile(format!(
                "{field} must be between 0 and {MAX_SCORE}, got {value}"
            )));
        }
        self.settings.validate()?;
        self.scorer.ensure_ready().map_err(|e| match e {
            ScoringError::Configuration(msg) => MatchError::Configuration(msg),
            other => MatchError::Configuration(other.to_string()),
        })?;

        let batches = Arc::new(plan_batches(&jobs, self.settings.batch_size)?);
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = info_span!(
            "match_run",
            %run_id,
            jobs = jobs.len(),
            batches = batches.len()
        );

        info!(
            parent: &span,
            cohort = %candidate.cohort,
            batch_size = self.settings.batch_size,
            max_concurrency = self.settings.max_concurrency,
            "starting match run"
        );

        let results = execute_batches(
            Arc::clone(&self.scorer),
            Arc::new(candidate),
            Arc::clone(&batches),
            self.settings.max_concurrency,
            progress.as_ref(),
        )
        .instrument(span.clone())
        .await;

        let aggregation = aggregate(&batches, &results);
        let report = MatchReport {
            run_id,
            outcomes: aggregation.outcomes,
            batches: aggregation.summaries,
            started_at,
            finished_at: Utc::now(),
        };

        let failed = report.failed_batches();
        if failed > 0 {
            warn!(
                parent: &span,
                failed_batches = failed,
                "match run finished with failed batches"
            );
        }
        info!(
            parent: &span,
            outcomes = report.outcomes.len(),
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "match run complete"
        );

        if let Some(tx) = progress {
            if tx.send(MatchEvent::Completed(report.clone())).await.is_err() {
                debug!(parent: &span, "progress receiver dropped before completion");
            }
        }

        Ok(report)
    }
}
