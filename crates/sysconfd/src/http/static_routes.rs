//! Built-in API routes served without plugin involvement.

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

const SERVICE_NAME: &str = "System Confd";

/// Builds the router for the built-in endpoints mounted under the API
/// prefix.
pub(crate) fn static_router() -> Router {
    Router::new()
        .route("/", get(metadata))
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/config", get(config))
}

async fn metadata() -> Json<Value> {
    Json(json!({
        "metadata": {
            "name": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "license": "MIT",
            "copyright": "The system-confd authors",
            "author": "The system-confd authors",
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "System Confd is running",
    }))
}

async fn version() -> Json<Value> {
    Json(json!({"version": env!("CARGO_PKG_VERSION")}))
}

// Configuration retrieval over the API is reserved but not implemented;
// the endpoint answers with an empty success so clients can probe for it.
async fn config() -> StatusCode {
    StatusCode::OK
}
