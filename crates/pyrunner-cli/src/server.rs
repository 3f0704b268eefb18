//! HTTP front end
//!
//! Thin JSON shim over [`Runner`]: parses the request body, validates it and
//! relays the execution report.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pyrunner::{ExecutionRequest, Inputs, Runner};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

/// Body of an execution request
#[derive(Debug, Deserialize)]
struct ExecuteBody {
    code: Option<String>,
    #[serde(default)]
    inputs: Option<Inputs>,
}

/// Build the application router
pub fn router(runner: Runner) -> Router {
    Router::new()
        .route("/api/execute_code", post(execute_code))
        .route("/execute_code", post(execute_code))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(runner))
}

/// Serve the router on `bind` until Ctrl-C
pub async fn serve(runner: Runner, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(runner))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

async fn execute_code(
    State(runner): State<Arc<Runner>>,
    body: Result<Json<ExecuteBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(%rejection, "rejected request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Request must be JSON" })),
            )
                .into_response();
        }
    };

    let request = match ExecutionRequest::new(body.code, body.inputs.unwrap_or_default()) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "output": "", "error": e.to_string() })),
            )
                .into_response();
        }
    };

    Json(runner.execute(&request).await).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
