use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tutoria_access::ApprovalError;
use tutoria_auth::AuthzError;
use tutoria_infra::{ReviewError, StoreError};
use tutoria_navigation::NavigationError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn review_error_to_response(err: ReviewError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        ReviewError::Approval(e) => approval_error_to_response(e),
        ReviewError::Store(e) => store_error_to_response(e),
        ReviewError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        ReviewError::NoOpenDraft(_) => json_error(StatusCode::NOT_FOUND, "no_open_draft", message),
        ReviewError::SubmissionInProgress(_) => {
            json_error(StatusCode::CONFLICT, "submission_in_progress", message)
        }
    }
}

pub fn approval_error_to_response(err: ApprovalError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        ApprovalError::InvalidRole { .. } => json_error(StatusCode::BAD_REQUEST, "invalid_role", message),
        ApprovalError::IncompleteDecision { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "incomplete_decision", message)
        }
        ApprovalError::DraftMismatch { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "draft_mismatch", message)
        }
        ApprovalError::AlreadyResolved(_) => json_error(StatusCode::CONFLICT, "already_resolved", message),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        StoreError::Unavailable(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", message)
        }
        StoreError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        StoreError::AlreadyResolved(_) => json_error(StatusCode::CONFLICT, "already_resolved", message),
        StoreError::Rejected(_) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "store_rejected", message),
    }
}

pub fn navigation_error_to_response(err: NavigationError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        NavigationError::UnauthorizedTab(_) => json_error(StatusCode::FORBIDDEN, "unauthorized_tab", message),
        NavigationError::InvalidSubTab { .. } => json_error(StatusCode::BAD_REQUEST, "invalid_sub_tab", message),
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}
