//! Per-user navigation and dashboard routes.
//!
//! Each call first syncs the caller's session with their current grants, so
//! revoked tabs are left before the handler runs.

use std::sync::Arc;

use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use tutoria_navigation::{NavigationError, NavigationModel, VisiblePanelDescriptor};

use crate::app::dto::{NavigationView, SelectSubTabRequest, SelectTabRequest};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/navigation", get(get_navigation))
        .route("/navigation/tab", post(select_tab))
        .route("/navigation/sub-tab", post(select_sub_tab))
        .route("/dashboard", get(dashboard))
}

fn with_session<R>(
    services: &AppServices,
    principal: &PrincipalContext,
    f: impl FnOnce(&mut NavigationModel) -> R,
) -> R {
    services
        .sessions
        .with_session(principal.user_id(), principal.granted(), f)
}

/// GET /navigation - current state, visible tabs and sub-tabs of the active tab
pub async fn get_navigation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Json<NavigationView> {
    Json(with_session(&services, &principal, |model| NavigationView::from(&*model)))
}

/// POST /navigation/tab - switch tab (resets the sub-tab)
pub async fn select_tab(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<SelectTabRequest>,
) -> axum::response::Response {
    let result = with_session(&services, &principal, |model| -> Result<NavigationView, NavigationError> {
        model.select_tab(body.tab)?;
        Ok(NavigationView::from(&*model))
    });

    match result {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::navigation_error_to_response(e),
    }
}

/// POST /navigation/sub-tab - switch sub-tab within the active tab
pub async fn select_sub_tab(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<SelectSubTabRequest>,
) -> axum::response::Response {
    let result = with_session(&services, &principal, |model| -> Result<NavigationView, NavigationError> {
        model.select_sub_tab(body.sub_tab)?;
        Ok(NavigationView::from(&*model))
    });

    match result {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::navigation_error_to_response(e),
    }
}

/// GET /dashboard - panel to render for the current state
pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Json<VisiblePanelDescriptor> {
    Json(with_session(&services, &principal, |model| {
        services.dashboard.render_session(model)
    }))
}
