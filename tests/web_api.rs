//! End-to-end tests: axum router, bridge task, and scripted server.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{printing_snapshot, ScriptedServer};
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tower::util::ServiceExt;

use odyssey_link::bridge::{Bridge, BridgeRequest};
use odyssey_link::config::Config;
use odyssey_link::remote::PrintServer;
use odyssey_link::web::api::create_router;

struct App {
    router: axum::Router,
    server: Arc<ScriptedServer>,
    shutdown_tx: broadcast::Sender<()>,
    bridge_handle: JoinHandle<()>,
}

async fn spawn_app(server: ScriptedServer) -> App {
    let server = Arc::new(server);
    let bridge = Bridge::new(server.clone() as Arc<dyn PrintServer>, &Config::default());

    let (bridge_tx, bridge_rx) = mpsc::channel::<BridgeRequest>(16);
    let (shutdown_tx, _) = broadcast::channel(1);
    let bridge_handle = tokio::spawn(bridge.run(bridge_rx, shutdown_tx.subscribe()));

    // Let the first poll land before tests query state.
    tokio::time::sleep(Duration::from_millis(50)).await;

    App {
        router: create_router(bridge_tx),
        server,
        shutdown_tx,
        bridge_handle,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, payload: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder().method("POST").uri(uri);
    match payload {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_status_reports_idle_after_first_poll() {
    let app = spawn_app(ScriptedServer::new()).await;

    let request = Request::builder()
        .uri("/api/v1/status")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["odyssey_status"], "Idle");
    assert_eq!(json["is_active"], false);
    assert_eq!(json["tracking"], false);
}

#[tokio::test]
async fn test_start_then_status_shows_stats() {
    let app = spawn_app(ScriptedServer::new()).await;

    let response = app
        .router
        .clone()
        .oneshot(post(
            "/api/v1/print/start",
            Some(json!({ "file": "cube.sl1" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/api/v1/status")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["stats"]["filename"], "cube");
    assert_eq!(json["stats"]["state"], "Printing");
}

#[tokio::test]
async fn test_start_while_tracking_returns_conflict() {
    let server = ScriptedServer::new();
    // The first poll observes an active print and starts tracking.
    server.push_snapshot(printing_snapshot(false, 5, 100));
    let app = spawn_app(server).await;

    let response = app
        .router
        .clone()
        .oneshot(post("/api/v1/print/start", Some(json!({ "file": "cube" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    // Rejected before dispatch: no start command reached the server.
    assert!(app.server.sent_commands().is_empty());
}

#[tokio::test]
async fn test_start_missing_file_maps_to_not_found() {
    let server = ScriptedServer::new();
    server.push_outcome(404, "Not Found");
    let app = spawn_app(server).await;

    let response = app
        .router
        .clone()
        .oneshot(post(
            "/api/v1/print/start",
            Some(json!({ "file": "missing" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("find"));
}

#[tokio::test]
async fn test_pause_failure_maps_to_bad_gateway() {
    let server = ScriptedServer::new();
    server.push_outcome(500, "Internal Server Error");
    let app = spawn_app(server).await;

    let response = app
        .router
        .clone()
        .oneshot(post("/api/v1/print/pause", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn test_cancel_roundtrip() {
    let app = spawn_app(ScriptedServer::new()).await;

    let response = app
        .router
        .clone()
        .oneshot(post("/api/v1/print/cancel", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_raw_status_passthrough() {
    let app = spawn_app(ScriptedServer::new()).await;

    let request = Request::builder()
        .uri("/api/v1/status/raw")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json.get("Idle").is_some());
}

#[tokio::test]
async fn test_shutdown_sends_best_effort_notification() {
    let app = spawn_app(ScriptedServer::new()).await;

    app.shutdown_tx.send(()).unwrap();
    app.bridge_handle.await.unwrap();
    assert!(app.server.was_shutdown_notified());
}
