//! Defines the Axum API routes and handlers.

use crate::bridge::BridgeRequest;
use crate::gateway::GatewayError;
use crate::web::models::{ErrorResponse, StartRequest, StatusResponse};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot;

pub type AppState = Sender<BridgeRequest>;

/// Creates the Axum router with all the API endpoints.
pub fn create_router(bridge_tx: AppState) -> Router {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/status/raw", get(get_raw_status))
        .route("/api/v1/print/start", post(start_print))
        .route("/api/v1/print/cancel", post(cancel_print))
        .route("/api/v1/print/pause", post(pause_print))
        .route("/api/v1/print/resume", post(resume_print))
        .with_state(bridge_tx)
}

/// Send a request to the bridge task and await its oneshot reply.
async fn call_bridge<T>(
    bridge_tx: &AppState,
    make: impl FnOnce(oneshot::Sender<T>) -> BridgeRequest,
) -> Result<T, StatusCode> {
    let (resp_tx, resp_rx) = oneshot::channel();
    if bridge_tx.send(make(resp_tx)).await.is_err() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    resp_rx.await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Map a gateway failure to an HTTP status plus its message, verbatim.
fn gateway_error_response(e: GatewayError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        GatewayError::Busy => StatusCode::CONFLICT,
        GatewayError::FileNotFound => StatusCode::NOT_FOUND,
        GatewayError::Server { .. } | GatewayError::Unreachable(_) => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

async fn get_status(
    State(bridge_tx): State<AppState>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let status = call_bridge(&bridge_tx, |respond_to| BridgeRequest::GetStatus {
        respond_to,
    })
    .await?;
    Ok(Json(status))
}

async fn get_raw_status(
    State(bridge_tx): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    let result = call_bridge(&bridge_tx, |respond_to| BridgeRequest::GetRawStatus {
        respond_to,
    })
    .await
    .map_err(|code| {
        (
            code,
            Json(ErrorResponse {
                error: "bridge unavailable".to_string(),
            }),
        )
    })?;
    match result {
        Ok(payload) => Ok(Json(payload)),
        Err(error) => Err((StatusCode::BAD_GATEWAY, Json(ErrorResponse { error }))),
    }
}

async fn start_print(
    State(bridge_tx): State<AppState>,
    Json(payload): Json<StartRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let result = call_bridge(&bridge_tx, |respond_to| BridgeRequest::Start {
        location: payload.location,
        file: payload.file,
        respond_to,
    })
    .await
    .map_err(internal_error)?;
    result
        .map(|_| StatusCode::OK)
        .map_err(gateway_error_response)
}

async fn cancel_print(
    State(bridge_tx): State<AppState>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    command(&bridge_tx, |respond_to| BridgeRequest::Cancel { respond_to }).await
}

async fn pause_print(
    State(bridge_tx): State<AppState>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    command(&bridge_tx, |respond_to| BridgeRequest::Pause { respond_to }).await
}

async fn resume_print(
    State(bridge_tx): State<AppState>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    command(&bridge_tx, |respond_to| BridgeRequest::Resume { respond_to }).await
}

async fn command(
    bridge_tx: &AppState,
    make: impl FnOnce(oneshot::Sender<Result<(), GatewayError>>) -> BridgeRequest,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let result = call_bridge(bridge_tx, make).await.map_err(internal_error)?;
    result
        .map(|_| StatusCode::OK)
        .map_err(gateway_error_response)
}

fn internal_error(code: StatusCode) -> (StatusCode, Json<ErrorResponse>) {
    (
        code,
        Json(ErrorResponse {
            error: "bridge unavailable".to_string(),
        }),
    )
}
