//! REST API layer built on Axum.
//!
//! Exposes the grow unit store under `/api/growunits`. Payload and path
//! errors are reported as 400, missing records as 404, and storage failures
//! as an opaque 500.

/// API error types mapped to HTTP status codes.
pub mod errors;
/// HTTP request handlers and application state.
pub mod handlers;
/// Response data transfer objects.
pub mod models;

use axum::routing::get;
use axum::Router;
use handlers::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/hello", get(handlers::hello))
        .route(
            "/api/growunits",
            get(handlers::list_grow_units).post(handlers::create_grow_unit),
        )
        .route(
            "/api/growunits/:id",
            get(handlers::get_grow_unit).put(handlers::update_grow_unit),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
