//! Batched resume-to-job matching: plan, score remotely with bounded
//! concurrency, validate and rank. The binary in `main.rs` serves it over HTTP.

pub mod config;
pub mod errors;
pub mod llm_client;
pub mod matching;
pub mod routes;
pub mod state;

pub use matching::orchestrator::{MatchSettings, MatchingOrchestrator};
pub use matching::MatchError;
