//! Route handlers

use super::{ApiError, AppState};
use crate::chart::render_line_chart;
use crate::chat::{ResponseBuffer, SessionStore};
use crate::markdown::render_markdown;
use crate::market::PriceSeries;
use crate::pipeline::ReportOutcome;
use crate::symbols::parse_symbols;
use agent_core::TextStream;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{
        Html, IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::{Stream, StreamExt, stream};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use tracing::{info, warn};

type ApiResult<T> = std::result::Result<T, ApiError>;

// Pages

pub async fn index_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    Ok(Html(state.pages.index()?))
}

pub async fn chat_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    Ok(Html(state.pages.chat()?))
}

pub async fn report_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    Ok(Html(state.pages.report()?))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "sessions": state.sessions.count().await,
    }))
}

// Chat sessions

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: String,
}

/// POST /api/sessions
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

/// DELETE /api/sessions/:id
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.sessions.end(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sessions/:id/history
pub async fn session_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.sessions.snapshot(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

/// POST /api/sessions/:id/messages
///
/// Streams `chunk` events (`{"text": ...}`) followed by one `done` event
/// carrying the full reply as markdown and rendered HTML, or an `error`
/// event if the reply failed.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let turn = state
        .sessions
        .with(&id, |session| session.begin_turn(&request.message))
        .await??;
    info!(session = %id, "Chat turn started");

    let reply = match state.assistant.stream_turn(turn, &id).await {
        Ok(reply) => reply,
        Err(e) => {
            let reason = e.to_string();
            let _ = state.sessions.with(&id, |s| s.abort_turn(&reason)).await;
            return Err(e.into());
        }
    };

    let relay = TurnRelay {
        sessions: state.sessions.clone(),
        id,
        reply: Some(reply),
        buffer: ResponseBuffer::new(),
    };
    Ok(Sse::new(stream::unfold(relay, TurnRelay::next_event)).keep_alive(KeepAlive::default()))
}

/// Forwards reply chunks as SSE events and settles the session at the end
struct TurnRelay {
    sessions: SessionStore,
    id: String,
    reply: Option<TextStream>,
    buffer: ResponseBuffer,
}

impl TurnRelay {
    async fn next_event(mut self) -> Option<(Result<Event, Infallible>, Self)> {
        let next = self.reply.as_mut()?.next().await;
        let event = match next {
            Some(Ok(chunk)) => {
                self.buffer.push(&chunk);
                Event::default()
                    .event("chunk")
                    .data(json!({ "text": chunk }).to_string())
            }
            Some(Err(e)) => {
                self.reply = None;
                let reason = e.to_string();
                warn!(session = %self.id, error = %reason, "Chat turn failed");
                let _ = self.sessions.with(&self.id, |s| s.abort_turn(&reason)).await;
                error_event(&reason)
            }
            None => {
                self.reply = None;
                let text = self.buffer.text().to_string();
                let finished = self
                    .sessions
                    .with(&self.id, |s| s.finish_turn(text.clone()))
                    .await;
                match finished {
                    Ok(Ok(())) => {
                        info!(session = %self.id, chunks = self.buffer.chunks(), "Chat turn complete");
                        let html = render_markdown(&text);
                        Event::default()
                            .event("done")
                            .data(json!({ "text": text, "html": html }).to_string())
                    }
                    Ok(Err(e)) | Err(e) => error_event(&e.to_string()),
                }
            }
        };
        Some((Ok(event), self))
    }
}

impl Drop for TurnRelay {
    fn drop(&mut self) {
        // Client went away mid-reply; free the session for the next turn
        if self.reply.is_some() {
            let sessions = self.sessions.clone();
            let id = std::mem::take(&mut self.id);
            tokio::spawn(async move {
                let _ = sessions.with(&id, |s| s.abort_turn("client disconnected")).await;
            });
        }
    }
}

fn error_event(message: &str) -> Event {
    Event::default()
        .event("error")
        .data(json!({ "message": message }).to_string())
}

// Reports

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    /// Comma-separated symbols
    pub symbols: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub outcome: ReportOutcome,
    /// Report or no-data message rendered from markdown
    pub html: String,
    /// Price chart of the symbols with data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
}

/// POST /api/report
pub async fn create_report(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<Json<ReportResponse>> {
    let symbols = parse_symbols(&request.symbols)?;
    info!(?symbols, "Report requested");

    let outcome = state.pipeline.final_report(&symbols).await?;
    let (html, chart) = match &outcome {
        ReportOutcome::Report(report) => {
            let series: Vec<PriceSeries> = report.performance.series().cloned().collect();
            (render_markdown(&report.report), Some(render_line_chart(&series)))
        }
        ReportOutcome::NoData { message } => (render_markdown(message), None),
    };

    Ok(Json(ReportResponse {
        outcome,
        html,
        chart,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    #[serde(default)]
    pub symbols: String,
}

/// GET /api/chart?symbols=AAPL,TSLA
pub async fn price_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<impl IntoResponse> {
    let symbols = parse_symbols(&query.symbols)?;
    let performance = state.pipeline.compare_performance(&symbols).await?;
    let series: Vec<PriceSeries> = performance.series().cloned().collect();

    Ok((
        [(header::CONTENT_TYPE, "image/svg+xml")],
        render_line_chart(&series),
    ))
}
