//! Admin routes: access request review and role revocation.
//!
//! Every handler requires the caller to hold the Administrator role. Drafts
//! are scoped to the calling administrator.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};

use tutoria_auth::{require_role, Role};
use tutoria_core::{AccessRequestId, UserId};
use tutoria_infra::RoleGrantDirectory;

use crate::app::dto::{AccessRequestView, DraftView, ResolvedView, RevokeRoleResponse, RoleDecisionRequest};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/access-requests", get(list_pending))
        .route(
            "/access-requests/:id/review",
            post(open_review).get(get_review).delete(discard_review),
        )
        .route("/access-requests/:id/review/roles/:role", put(decide_role))
        .route("/access-requests/:id/review/submit", post(submit_review))
        .route("/users/:id/roles/:role", delete(revoke_role))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn require_admin(principal: &PrincipalContext) -> Result<UserId, Response> {
    require_role(&principal.principal(), Role::Administrator)
        .map_err(errors::authz_error_to_response)?;
    Ok(principal.user_id())
}

fn parse_request_id(raw: &str) -> Result<AccessRequestId, Response> {
    raw.parse()
        .map_err(|e: tutoria_core::DomainError| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

fn parse_user_id(raw: &str) -> Result<UserId, Response> {
    raw.parse()
        .map_err(|e: tutoria_core::DomainError| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

fn parse_role(raw: &str) -> Result<Role, Response> {
    raw.parse()
        .map_err(|e: tutoria_auth::RoleParseError| errors::json_error(StatusCode::BAD_REQUEST, "invalid_role", e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /admin/access-requests - pending queue, newest first
pub async fn list_pending(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    if let Err(resp) = require_admin(&principal) {
        return resp;
    }

    match services.reviews.pending().await {
        Ok(pending) => {
            Json(pending.iter().map(AccessRequestView::from).collect::<Vec<_>>()).into_response()
        }
        Err(e) => errors::review_error_to_response(e),
    }
}

/// POST /admin/access-requests/:id/review - open (or resume) a review draft
pub async fn open_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let (reviewer, id) = match require_admin(&principal).and_then(|r| Ok((r, parse_request_id(&id)?))) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.reviews.open(reviewer, id).await {
        Ok(draft) => Json(DraftView::from(&draft)).into_response(),
        Err(e) => errors::review_error_to_response(e),
    }
}

/// GET /admin/access-requests/:id/review - current draft
pub async fn get_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let (reviewer, id) = match require_admin(&principal).and_then(|r| Ok((r, parse_request_id(&id)?))) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.reviews.draft(reviewer, id) {
        Ok(draft) => Json(DraftView::from(&draft)).into_response(),
        Err(e) => errors::review_error_to_response(e),
    }
}

/// PUT /admin/access-requests/:id/review/roles/:role - approve/reject (toggle)
pub async fn decide_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, role)): Path<(String, String)>,
    Json(body): Json<RoleDecisionRequest>,
) -> Response {
    let parsed = require_admin(&principal)
        .and_then(|r| Ok((r, parse_request_id(&id)?, parse_role(&role)?)));
    let (reviewer, id, role) = match parsed {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.reviews.decide(reviewer, id, role, body.approved) {
        Ok(draft) => Json(DraftView::from(&draft)).into_response(),
        Err(e) => errors::review_error_to_response(e),
    }
}

/// POST /admin/access-requests/:id/review/submit - validate, apply and persist
pub async fn submit_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let (reviewer, id) = match require_admin(&principal).and_then(|r| Ok((r, parse_request_id(&id)?))) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.reviews.submit(reviewer, id).await {
        Ok(resolved) => Json(ResolvedView::from(resolved)).into_response(),
        Err(e) => errors::review_error_to_response(e),
    }
}

/// DELETE /admin/access-requests/:id/review - discard the draft
pub async fn discard_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let (reviewer, id) = match require_admin(&principal).and_then(|r| Ok((r, parse_request_id(&id)?))) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.reviews.discard(reviewer, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::review_error_to_response(e),
    }
}

/// DELETE /admin/users/:id/roles/:role - revoke a granted role
pub async fn revoke_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((user, role)): Path<(String, String)>,
) -> Response {
    let parsed = require_admin(&principal)
        .and_then(|r| Ok((r, parse_user_id(&user)?, parse_role(&role)?)));
    let (admin, user_id, role) = match parsed {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store.revoke_role(user_id, role).await {
        Ok(revoked) => {
            tracing::info!(
                user_id = %user_id,
                role = %role,
                revoked,
                by = %admin,
                "role revoked"
            );
            Json(RevokeRoleResponse {
                user_id,
                role,
                revoked,
            })
            .into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
