use thiserror::Error;

use tutoria_core::UserId;

use crate::{GrantedRoleSet, Role};

/// A resolved principal for authorization decisions.
///
/// Construction is decoupled from storage and transport: the API derives it
/// from the identity provider and the role-grant directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub granted: GrantedRoleSet,
}

impl Principal {
    pub fn new(user_id: UserId, granted: GrantedRoleSet) -> Self {
        Self { user_id, granted }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing role '{0}'")]
    MissingRole(Role),
}

/// Require the principal to hold `role`.
///
/// - No IO
/// - No panics
pub fn require_role(principal: &Principal, role: Role) -> Result<(), AuthzError> {
    if principal.granted.contains(role) {
        Ok(())
    } else {
        Err(AuthzError::MissingRole(role))
    }
}
