use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use tutoria_auth::{GrantedRoleSet, Role};
use tutoria_core::UserId;
use tutoria_infra::RoleGrantDirectory;

use crate::app::errors;
use crate::context::PrincipalContext;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct IdentityState {
    pub grants: Arc<dyn RoleGrantDirectory>,
    pub bootstrap_admins: Arc<BTreeSet<UserId>>,
}

impl IdentityState {
    async fn granted_roles(&self, user: UserId) -> Result<GrantedRoleSet, tutoria_infra::StoreError> {
        let mut granted = self.grants.granted_roles(user).await?;
        if self.bootstrap_admins.contains(&user) {
            granted.insert(Role::Administrator);
        }
        Ok(granted)
    }
}

/// Resolve the caller from `x-user-id` and attach a [`PrincipalContext`].
pub async fn identity_middleware(
    State(state): State<IdentityState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let user_id = extract_user_id(req.headers()).map_err(|status| {
        errors::json_error(status, "unauthenticated", "missing or invalid x-user-id header")
    })?;

    let granted = state
        .granted_roles(user_id)
        .await
        .map_err(errors::store_error_to_response)?;

    req.extensions_mut()
        .insert(PrincipalContext::new(user_id, granted));

    Ok(next.run(req).await)
}

fn extract_user_id(headers: &HeaderMap) -> Result<UserId, StatusCode> {
    headers
        .get(USER_ID_HEADER)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?
        .parse()
        .map_err(|_| StatusCode::UNAUTHORIZED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn user_id_header_is_required_and_parsed() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_user_id(&headers), Err(StatusCode::UNAUTHORIZED));

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("nope"));
        assert_eq!(extract_user_id(&headers), Err(StatusCode::UNAUTHORIZED));

        let id = UserId::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(extract_user_id(&headers), Ok(id));
    }
}
