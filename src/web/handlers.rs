//! HTTP handlers
//!
//! The calculate handler is the only endpoint with logic: it maps the error
//! taxonomy onto status codes (validation -> 400, engine -> 500) and leaves
//! everything else to the service.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::core::{TariffService, validate};
use crate::traits::{EngineRunner, RateLookup};
use crate::types::RawTariffRequest;

/// Calculate endpoint - POST /calculate
pub async fn calculate<R, E>(
    State(service): State<TariffService<R, E>>,
    payload: Result<Json<RawTariffRequest>, JsonRejection>,
) -> Response
where
    R: RateLookup + Send + Sync + 'static,
    E: EngineRunner + Send + Sync + 'static,
{
    let raw = match payload {
        Ok(Json(raw)) => raw,
        Err(rejection) => {
            let body = json!({ "error": format!("Missing or non-integer field: {rejection}") });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let request = match validate(raw) {
        Ok(request) => request,
        Err(err) => {
            let body = json!({ "error": err.to_string() });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match service.calculate(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            tracing::error!(%err, "engine run failed");
            let body = json!({ "error": "ASM engine failed", "detail": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Health check endpoint - GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
