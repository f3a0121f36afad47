use axum::{extract::Extension, http::StatusCode, Json};

use crate::app::dto::{badges, WhoAmIResponse};
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        user_id: principal.user_id(),
        roles: badges(principal.granted()),
    })
}
