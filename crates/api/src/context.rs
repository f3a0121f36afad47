use tutoria_auth::{GrantedRoleSet, Principal};
use tutoria_core::UserId;

/// Identity of the caller for one request (user id + currently granted roles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    granted: GrantedRoleSet,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, granted: GrantedRoleSet) -> Self {
        Self { user_id, granted }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn granted(&self) -> &GrantedRoleSet {
        &self.granted
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id, self.granted.clone())
    }
}
