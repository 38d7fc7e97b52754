//! HTTP front end
//!
//! Serves the chat and report pages and their JSON/SSE APIs:
//! - `GET /`, `/chat`, `/report`: HTML pages
//! - `POST /api/sessions`, `DELETE /api/sessions/:id`,
//!   `GET /api/sessions/:id/history`: chat session lifecycle
//! - `POST /api/sessions/:id/messages`: one chat turn as an SSE stream
//! - `POST /api/report`: full investment report
//! - `GET /api/chart?symbols=`: price history chart (SVG)
//! - `GET /health`

mod error;
mod handlers;
mod pages;

pub use error::ApiError;
pub use pages::Pages;

use crate::chat::{ChatAssistant, SessionStore};
use crate::error::Result;
use crate::pipeline::ReportPipeline;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub assistant: ChatAssistant,
    pub pipeline: ReportPipeline,
    pub pages: Arc<Pages>,
}

impl AppState {
    pub fn new(
        sessions: SessionStore,
        assistant: ChatAssistant,
        pipeline: ReportPipeline,
    ) -> Result<Self> {
        Ok(Self {
            sessions,
            assistant,
            pipeline,
            pages: Arc::new(Pages::new()?),
        })
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index_page))
        .route("/chat", get(handlers::chat_page))
        .route("/report", get(handlers::report_page))
        .route("/health", get(handlers::health))
        .route("/api/sessions", post(handlers::create_session))
        .route("/api/sessions/:id", delete(handlers::end_session))
        .route("/api/sessions/:id/history", get(handlers::session_history))
        .route("/api/sessions/:id/messages", post(handlers::send_message))
        .route("/api/report", post(handlers::create_report))
        .route("/api/chart", get(handlers::price_chart))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C, sweeping idle sessions meanwhile
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        session_idle_secs = state.sessions.idle_timeout().as_secs(),
        "Server listening"
    );
    let sweeper = state.sessions.spawn_sweeper();

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    sweeper.abort();
    Ok(())
}
