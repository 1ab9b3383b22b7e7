mod assessment;
mod catalog;
mod config;
mod errors;
mod llm_client;
mod models;
mod report;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::CompetencyCatalog;
use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::session::store::SessionStore;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (refuses to start without GEMINI_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RPL Assistant API v{}", env!("CARGO_PKG_VERSION"));

    let catalog = Arc::new(CompetencyCatalog::tae40122());
    info!(
        "Competency catalog loaded: {} ({} target criteria)",
        catalog.qualification,
        catalog.target_criteria_count()
    );

    let gemini = GeminiClient::from_config(&config).context("Failed to build Gemini client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));
    sessions.spawn_idle_sweep(SESSION_SWEEP_INTERVAL);
    info!("Idle sessions expire after {}s", config.session_ttl_secs);

    let state = AppState {
        catalog,
        assessor: Arc::new(gemini),
        sessions,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
