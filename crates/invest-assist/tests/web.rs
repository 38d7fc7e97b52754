mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::{EchoProvider, sample_market, services};
use invest_assist::EMPTY_SYMBOLS_MESSAGE;
use invest_assist::web::router;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> axum::Router {
    app_replying("answer")
}

fn app_replying(reply: &str) -> axum::Router {
    let provider = Arc::new(EchoProvider::new(reply));
    let services = services(provider, sample_market());
    router(services.app_state().unwrap())
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_index_shows_ticker_guide() {
    let response = app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("INFY.BO"));
}

#[tokio::test]
async fn test_report_rejects_empty_symbols() {
    let response = app()
        .oneshot(post_json("/api/report", &json!({ "symbols": " , ," })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["message"], EMPTY_SYMBOLS_MESSAGE);
}

#[tokio::test]
async fn test_report_with_chart() {
    let response = app()
        .oneshot(post_json("/api/report", &json!({ "symbols": "AAPL, TCS.NS" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["outcome"]["status"], "report");
    assert_eq!(body["outcome"]["report"], "Team Lead: answer");
    assert_eq!(body["html"], "<p>Team Lead: answer</p>\n");
    assert!(body["chart"].as_str().unwrap().contains("<polyline"));
}

#[tokio::test]
async fn test_report_markdown_table_rendered() {
    let reply = "ranking\n\n| Rank | Symbol |\n|---|---|\n| 1 | AAPL |\n| 2 | TCS.NS |\n";
    let response = app_replying(reply)
        .oneshot(post_json("/api/report", &json!({ "symbols": "AAPL, TCS.NS" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("<table>"));
    assert!(html.contains("<th>Symbol</th>"));
    assert!(html.contains("<td>TCS.NS</td>"));
    // Raw markdown is still returned
    assert!(body["outcome"]["report"].as_str().unwrap().contains("| 1 | AAPL |"));
}

#[tokio::test]
async fn test_chart_endpoint() {
    let response = app()
        .oneshot(get("/api/chart?symbols=AAPL,TCS.NS"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    assert_eq!(body_text(response).await.matches("<polyline").count(), 2);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::builder().method("POST").uri("/api/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let id = created["session_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/sessions/{id}/messages"),
            &json!({ "message": "Analyst view on NVDA?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let events = body_text(response).await;
    assert!(events.contains("event: chunk"));
    assert!(events.contains("event: done"));
    assert!(events.contains(r#""html":"<p>Finance &amp; Web Assistant: answer</p>\n""#));
    assert!(!events.contains("event: error"));

    let response = app
        .clone()
        .oneshot(get(&format!("/api/sessions/{id}/history")))
        .await
        .unwrap();
    let session: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(session["history"].as_array().unwrap().len(), 2);
    assert_eq!(session["last_symbol"], "NVDA");
    assert_eq!(session["state"], "idle");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get(&format!("/api/sessions/{id}/history")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::builder().method("POST").uri("/api/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let created: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let id = created["session_id"].as_str().unwrap();

    let response = app
        .oneshot(post_json(&format!("/api/sessions/{id}/messages"), &json!({ "message": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
