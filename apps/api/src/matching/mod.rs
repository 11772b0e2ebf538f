// Batched matching: plan → execute (bounded fan-out) → aggregate.
// All remote scoring goes through the BatchScorer trait; no direct HTTP here.

pub mod aggregator;
pub mod executor;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod prompts;
pub mod scorer;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

/// Run-level failures. Anything that happens inside a single batch is
/// contained there and never surfaces as a `MatchError`.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Job catalog is empty")]
    EmptyCatalog,

    #[error("Candidate profile is empty")]
    EmptyResume,

    #[error("Invalid candidate profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid match settings: {0}")]
    InvalidSettings(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
