use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobmatch_api::config::Config;
use jobmatch_api::llm_client::LlmClient;
use jobmatch_api::matching::scorer::LlmBatchScorer;
use jobmatch_api::routes::build_router;
use jobmatch_api::state::AppState;
use jobmatch_api::MatchingOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.llm.clone()).context("Failed to build HTTP client")?;
    if llm.ensure_configured().is_err() {
        warn!("LLM_API_KEY is not set; match requests will fail until it is configured");
    }
    info!(
        model = llm.model(),
        timeout_secs = config.llm.timeout.as_secs(),
        "LLM client initialized"
    );

    let matcher = MatchingOrchestrator::new(Arc::new(LlmBatchScorer::new(llm)), config.matching);
    info!(
        batch_size = config.matching.batch_size,
        max_concurrency = config.matching.max_concurrency,
        "Matching orchestrator ready"
    );

    let state = AppState { matcher };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
