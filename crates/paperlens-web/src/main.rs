use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paperlens_core::config_file::{self, ConfigFile};
use paperlens_extract::Extractor;

mod handlers;
mod models;
mod state;
mod upload;

use state::AppState;

const DEFAULT_BIND: &str = "0.0.0.0:5001";
const DEFAULT_MAX_UPLOAD_MB: u64 = 16;

/// Listener settings after the config file and environment are applied.
#[derive(Debug, Clone, PartialEq)]
struct ServerSettings {
    bind: String,
    max_upload_bytes: usize,
}

impl ServerSettings {
    /// Resolve settings: environment (`PAPERLENS_BIND`,
    /// `PAPERLENS_MAX_UPLOAD_MB`) > config file > defaults.
    fn resolve(file: &ConfigFile, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let server = file.server.clone().unwrap_or_default();

        let bind = env("PAPERLENS_BIND")
            .or(server.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let max_upload_mb = match env("PAPERLENS_MAX_UPLOAD_MB") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow::anyhow!("PAPERLENS_MAX_UPLOAD_MB={raw:?}: {e}"))?,
            None => server.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB),
        };
        if max_upload_mb == 0 {
            anyhow::bail!("max upload size must be at least 1 MB");
        }

        Ok(Self {
            bind,
            max_upload_bytes: (max_upload_mb * 1024 * 1024) as usize,
        })
    }
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/extract", post(handlers::extract::extract_upload))
        .route("/api/extract/text", post(handlers::extract::extract_pasted))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutting down");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let file = config_file::load_config();
    let settings = ServerSettings::resolve(&file, |key| std::env::var(key).ok())?;
    let config = file
        .extraction_builder()
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid extraction config: {}", e))?;

    let state = Arc::new(AppState::new(
        Extractor::with_config(config),
        settings.max_upload_bytes,
    ));

    let listener = tokio::net::TcpListener::bind(&settings.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        max_upload_bytes = settings.max_upload_bytes,
        "listening"
    );
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
