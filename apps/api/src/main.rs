mod analysis;
mod config;
mod errors;
mod llm_client;
mod models;
mod notify;
mod requisitions;
mod routes;
mod screening;
mod state;
mod store;
mod submission;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::GitCliFetcher;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::notify::ResendMailer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{JsonFileBackend, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hireflow API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        min_shortlist_score = config.screening.min_shortlist_score,
        min_hold_score = config.screening.min_hold_score,
        force_shortlist_override = config.screening.force_shortlist_override,
        "Screening policy loaded"
    );

    // Initialize the JSON record store
    let backend = JsonFileBackend::new(config.data_dir.clone());
    backend
        .init()
        .await
        .with_context(|| format!("initializing data dir {}", config.data_dir.display()))?;
    let store = Arc::new(RecordStore::new(Arc::new(backend)));
    info!("Record store ready at {}", config.data_dir.display());

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize mail transport
    let mailer = ResendMailer::new(config.resend_api_key.clone(), config.mail_from.clone())?;
    if config.admin_email.is_none() {
        info!("ADMIN_EMAIL not set; admin copies are disabled");
    }

    let state = AppState::assemble(
        &config,
        store,
        Arc::new(llm),
        Arc::new(GitCliFetcher::default()),
        Arc::new(mailer),
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
