//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, review pipeline, navigation layout and per-user sessions
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use tutoria_infra::StoreError;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> Result<Router, StoreError> {
    let services = Arc::new(services::build_services(config)?);
    Ok(router_with(services, config))
}

/// Router over already-built services.
pub fn router_with(services: Arc<services::AppServices>, config: &ApiConfig) -> Router {
    let identity = middleware::IdentityState {
        grants: services.store.clone(),
        bootstrap_admins: Arc::new(config.bootstrap_admins.iter().copied().collect::<BTreeSet<_>>()),
    };

    // Protected routes: require a caller identity.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            identity,
            middleware::identity_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
