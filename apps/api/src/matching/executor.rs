//! Concurrency-Limited Batch Executor.
//!
//! Batches run in waves of at most `max_concurrency`; a wave is fully drained
//! before the next one is admitted, so no more than `max_concurrency` scoring
//! calls are ever outstanding. A failing (or panicking) batch yields an empty
//! contribution and never aborts its siblings.
//!
//! Batch tasks are detached: if the caller drops the run, calls already in
//! flight still run to completion and only the next wave is never admitted.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info_span, warn, Instrument};

use crate::matching::aggregator::{aggregate, BatchResult};
use crate::matching::models::{Batch, CandidateProfile, MatchEvent};
use crate::matching::scorer::{BatchScorer, ScoringError};

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Runs every batch exactly once and returns one result per batch, ordered by index.
///
/// When `progress` is set, a ranked partial snapshot is sent after each wave
/// except the last. A dropped receiver is ignored.
pub async fn execute_batches(
    scorer: Arc<dyn BatchScorer>,
    candidate: Arc<CandidateProfile>,
    batches: Arc<Vec<Batch>>,
    max_concurrency: usize,
    progress: Option<&mpsc::Sender<MatchEvent>>,
) -> Vec<BatchResult> {
    let total = batches.len();
    let wave_size = max_concurrency.max(1);
    let mut slots: Vec<Option<BatchResult>> = (0..total).map(|_| None).collect();

    let mut wave_start = 0;
    while wave_start < total {
        let wave_end = (wave_start + wave_size).min(total);
        debug!(
            first_batch = wave_start,
            last_batch = wave_end - 1,
            "admitting wave"
        );

        let handles: Vec<_> = (wave_start..wave_end)
            .map(|index| {
                let task = run_batch(
                    Arc::clone(&scorer),
                    Arc::clone(&candidate),
                    Arc::clone(&batches),
                    index,
                );
                tokio::spawn(task.instrument(info_span!("batch", index)))
            })
            .collect();

        for handle in handles {
            match handle.await {
                Ok(result) => {
                    let index = result.index;
                    slots[index] = Some(result);
                }
                Err(join_err) => warn!(error = %join_err, "batch task did not complete"),
            }
        }

        // Tasks that panicked never filled their slot.
        for (index, slot) in slots.iter_mut().enumerate().take(wave_end).skip(wave_start) {
            if slot.is_none() {
                *slot = Some(BatchResult {
                    index,
                    scored: Err(ScoringError::Aborted(
                        "scoring task panicked or was cancelled".to_string(),
                    )),
                });
            }
        }

        wave_start = wave_end;

        if wave_start < total {
            if let Some(tx) = progress {
                send_progress(tx, &batches, &slots, wave_start, total).await;
            }
        }
    }

    slots.into_iter().flatten().collect()
}

async fn run_batch(
    scorer: Arc<dyn BatchScorer>,
    candidate: Arc<CandidateProfile>,
    batches: Arc<Vec<Batch>>,
    index: usize,
) -> BatchResult {
    let batch = &batches[index];
    let started = Instant::now();
    let scored = scorer.score_batch(&candidate, &batch.jobs).await;

    match &scored {
        Ok(verdicts) => debug!(
            jobs = batch.len(),
            verdicts = verdicts.verdicts.len(),
            unreadable = verdicts.unreadable,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch scored"
        ),
        Err(err) => warn!(
            jobs = batch.len(),
            error = %err,
            "batch failed, contributing no outcomes"
        ),
    }

    BatchResult { index, scored }
}

async fn send_progress(
    tx: &mpsc::Sender<MatchEvent>,
    batches: &[Batch],
    slots: &[Option<BatchResult>],
    completed_batches: usize,
    total_batches: usize,
) {
    let outcomes = aggregate(batches, slots.iter().flatten()).outcomes;

    let event = MatchEvent::Progress {
        completed_batches,
        total_batches,
        outcomes,
    };
    if tx.send(event).await.is_err() {
        debug!("progress receiver dropped, continuing without progress updates");
    }
}
