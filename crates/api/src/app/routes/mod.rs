use axum::{routing::get, Router};

pub mod admin;
pub mod navigation;
pub mod system;

/// Router for all endpoints that need a caller identity.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(navigation::router())
        .nest("/admin", admin::router())
}
