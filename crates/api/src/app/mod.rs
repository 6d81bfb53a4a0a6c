//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: which record store backs the API, permission resolution
//! - `routes/`: HTTP routes + handlers (generic CRUD plus system endpoints)
//! - `envelope.rs`: the `{ success, data, message }` response shape
//! - `errors.rs`: one error type, mapped to status codes in one place

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use wms_auth::{Hs256JwtValidator, JwtValidator};

use crate::config::ApiConfig;
use crate::middleware;

pub mod envelope;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.clone().into_bytes()));
    Ok(router(services, jwt))
}

/// Assemble the router around already-built services.
pub fn router(services: Arc<services::AppServices>, jwt: Arc<dyn JwtValidator>) -> Router {
    let auth_state = middleware::AuthState {
        jwt,
        services: services.clone(),
    };

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .fallback(routes::system::not_found)
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", protected)
        .fallback(routes::system::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
