//! Axum router construction

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::core::TariffService;
use crate::traits::{EngineRunner, RateLookup};

/// Build the router with all routes and the CORS layer
pub fn build_router<R, E>(service: TariffService<R, E>) -> Router
where
    R: RateLookup + Send + Sync + 'static,
    E: EngineRunner + Send + Sync + 'static,
{
    Router::new()
        .route("/calculate", post(handlers::calculate))
        .route("/health", get(handlers::health))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()).into_inner())
        .with_state(service)
}
