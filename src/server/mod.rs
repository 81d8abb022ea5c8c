//! HTTP server wiring

pub mod routes;
pub mod state;

pub use state::AppState;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::session::SessionPhase;

/// The HTTP front end over one chat session.
pub struct ChatServer {
    config: ChatConfig,
    state: AppState,
}

impl ChatServer {
    /// Build a server with an Ollama-backed session.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Build a server around existing state. Used by tests to swap in
    /// stub providers.
    pub fn with_state(config: ChatConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health))
            .route("/ready", get(readiness))
            .nest("/api", routes::api_routes(self.config.server.max_upload_size))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        if self.config.server.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }
        router
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::internal(format!("failed to bind {addr}: {e}")))?;
        info!(addr = %addr, "server listening");
        axum::serve(listener, self.build_router()).await?;
        Ok(())
    }
}

/// GET /health: process liveness, independent of session state.
async fn health() -> &'static str {
    "OK"
}

/// GET /ready: 200 only once a document has been ingested.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.session().phase() == SessionPhase::Ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "no document ingested")
    }
}
