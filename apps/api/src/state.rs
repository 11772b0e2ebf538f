use crate::matching::orchestrator::MatchingOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the scorer and batch/concurrency settings for every run.
    pub matcher: MatchingOrchestrator,
}
