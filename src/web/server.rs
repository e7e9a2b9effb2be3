//! Router, shared state and the listening loop

use crate::core::Downloader;
use crate::extractor::YtDlp;
use crate::web::auth::{IdentityProvider, MemorySessions, DEFAULT_SESSION_TTL};
use crate::web::handlers;
use crate::Result;
use axum::routing::{get, post};
use axum::Router;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Address the server listens on unless configured otherwise
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Everything needed to start the web server
#[derive(Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub yt_dlp: PathBuf,
    pub temp_dir: Option<PathBuf>,
    pub password: Option<String>,
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            yt_dlp: PathBuf::from(crate::extractor::ytdlp::DEFAULT_BINARY),
            temp_dir: None,
            password: None,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("yt_dlp", &self.yt_dlp)
            .field("temp_dir", &self.temp_dir)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

impl ServerConfig {
    /// Build the downloader and session table this configuration describes
    pub fn app_state(&self) -> AppState {
        let mut downloader = Downloader::new(Arc::new(YtDlp::new().with_binary(&self.yt_dlp)));
        if let Some(dir) = &self.temp_dir {
            downloader = downloader.with_temp_root(dir);
        }

        let mut sessions = MemorySessions::new().with_ttl(self.session_ttl);
        if let Some(password) = &self.password {
            sessions = sessions.with_password(password.clone());
        }

        AppState::new(downloader, sessions)
    }
}

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub downloader: Arc<Downloader>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(downloader: Downloader, identity: impl IdentityProvider + 'static) -> Self {
        Self {
            downloader: Arc::new(downloader),
            identity: Arc::new(identity),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/download", post(handlers::download))
        .route("/healthz", get(handlers::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = config.app_state();
    if !state.identity.requires_password() {
        warn!("No access password configured; any name can sign in");
    }

    let listener = TcpListener::bind(&config.bind).await?;
    info!(
        "Listening on http://{} (yt-dlp: {}, sessions last {})",
        listener.local_addr()?,
        config.yt_dlp.display(),
        humantime::format_duration(config.session_ttl)
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
