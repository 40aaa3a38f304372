mod auth;
mod config;
mod errors;
mod export;
mod extraction;
mod generation;
mod llm_client;
mod models;
mod persistence;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::GoogleIdentity;
use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::persistence::{theme::load_theme, FileStore};
use crate::routes::build_router;
use crate::session::SessionRegistry;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Missing credentials are fatal: nothing is served without them.
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cover Letter API v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(FileStore::open(&config.data_dir)?);
    info!("Local store at {}", config.data_dir.display());

    let theme = load_theme(store.as_ref());
    info!("Theme preference: {}", theme.as_str());

    let llm = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_api_url.clone());
    info!("Gemini client initialized ({})", config.gemini_api_url);

    let identity = GoogleIdentity::new(config.google_userinfo_url.clone());

    let sessions = SessionRegistry::new();
    sessions.spawn_sweeper(config.session_idle_timeout, SESSION_SWEEP_INTERVAL);
    info!(
        "Idle sessions expire after {} minutes",
        config.session_idle_timeout.as_secs() / 60
    );

    let state = AppState {
        llm: Arc::new(llm),
        identity: Arc::new(identity),
        store,
        sessions,
        theme: Arc::new(RwLock::new(theme)),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
