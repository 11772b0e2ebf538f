//! Chunk Planner: splits the ordered catalog into fixed-size batches.

use crate::matching::models::{Batch, JobPosting};
use crate::matching::MatchError;

pub const DEFAULT_BATCH_SIZE: usize = 30;

/// Partitions `jobs` into `⌈N / batch_size⌉` contiguous batches, preserving order.
///
/// The last batch may be short. An empty catalog yields no batches.
pub fn plan_batches(jobs: &[JobPosting], batch_size: usize) -> Result<Vec<Batch>, MatchError> {
    if batch_size == 0 {
        return Err(MatchError::InvalidSettings(
            "batch size must be greater than zero".to_string(),
        ));
    }

    Ok(jobs
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            offset: index * batch_size,
            jobs: chunk.to_vec(),
        })
        .collect())
}
