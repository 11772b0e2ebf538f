//! Result Aggregator: validates per-batch verdicts and ranks them.
//!
//! Ranking: score descending, ties broken by catalog position (earlier job
//! first). The order is therefore independent of batch completion order and
//! of the order the scorer lists its verdicts in.

use std::collections::{HashMap, HashSet};

use crate::matching::models::{
    Batch, BatchStatus, BatchSummary, BatchVerdicts, MatchOutcome, RecommendationTier, ScoredJob,
};
use crate::matching::scorer::ScoringError;

/// What one batch produced. Slotted by `index`, never by completion order.
#[derive(Debug)]
pub struct BatchResult {
    pub index: usize,
    pub scored: Result<BatchVerdicts, ScoringError>,
}

#[derive(Debug, Default)]
pub struct Aggregation {
    pub outcomes: Vec<MatchOutcome>,
    pub summaries: Vec<BatchSummary>,
}

/// Merges the given batch results into one ranked list.
///
/// `results` may cover only part of `batches` (progress snapshots).
pub fn aggregate<'a>(
    batches: &[Batch],
    results: impl IntoIterator<Item = &'a BatchResult>,
) -> Aggregation {
    let mut ranked: Vec<(usize, MatchOutcome)> = Vec::new();
    let mut summaries = Vec::new();

    for result in results {
        let Some(batch) = batches.get(result.index) else {
            continue;
        };

        let status = match &result.scored {
            Ok(scored) => {
                let before = ranked.len();
                let discarded = collect_valid(batch, &scored.verdicts, &mut ranked);
                BatchStatus::Scored {
                    accepted: ranked.len() - before,
                    discarded: discarded + scored.unreadable,
                }
            }
            Err(err) => BatchStatus::Failed {
                error: err.to_string(),
            },
        };

        summaries.push(BatchSummary {
            index: batch.index,
            job_count: batch.len(),
            status,
        });
    }

    ranked.sort_by(|(pos_a, a), (pos_b, b)| b.score.cmp(&a.score).then(pos_a.cmp(pos_b)));
    summaries.sort_by_key(|s| s.index);

    Aggregation {
        outcomes: ranked.into_iter().map(|(_, outcome)| outcome).collect(),
        summaries,
    }
}

/// Pushes `(catalog position, outcome)` for every verdict that resolves to a
/// job in `batch`. Returns how many verdicts were dropped.
///
/// An echoed id resolves by exact match first, then by whitespace-trimmed match.
fn collect_valid(
    batch: &Batch,
    verdicts: &[ScoredJob],
    ranked: &mut Vec<(usize, MatchOutcome)>,
) -> usize {
    let mut exact: HashMap<&str, usize> = HashMap::new();
    let mut trimmed: HashMap<&str, usize> = HashMap::new();
    for (pos, job) in batch.jobs.iter().enumerate() {
        exact.entry(job.id.as_str()).or_insert(pos);
        trimmed.entry(job.id.trim()).or_insert(pos);
    }
    let mut seen = HashSet::new();
    let mut discarded = 0;

    for verdict in verdicts {
        let resolved = exact
            .get(verdict.job_id.as_str())
            .or_else(|| trimmed.get(verdict.job_id.trim()));
        match resolved {
            Some(&pos) if seen.insert(pos) => {
                let job = &batch.jobs[pos];
                ranked.push((
                    batch.offset + pos,
                    MatchOutcome {
                        job_id: job.id.clone(),
                        score: verdict.score,
                        reasons: verdict.reasons.clone(),
                        risks: verdict.risks.clone(),
                        tier: RecommendationTier::from_score(verdict.score),
                        tip: verdict.tip.clone(),
                        job: job.clone(),
                    },
                ));
            }
            _ => discarded += 1,
        }
    }

    discarded
}
