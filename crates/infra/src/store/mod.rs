//! Access request persistence boundary.
//!
//! The approval workflow only talks to these traits; the in-memory backend is
//! the one used by the HTTP service and tests.

use async_trait::async_trait;
use thiserror::Error;

use tutoria_access::{AccessRequest, ResolvedDecision};
use tutoria_auth::{GrantedRoleSet, Role};
use tutoria_core::{AccessRequestId, UserId};

pub mod in_memory;

pub use in_memory::InMemoryAccessRequestStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend could not be reached or failed mid-operation. Retryable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("access request {0} not found")]
    NotFound(AccessRequestId),

    #[error("access request {0} is already resolved")]
    AlreadyResolved(AccessRequestId),

    /// The backend refused the write as inconsistent with the stored request.
    #[error("store rejected the write: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Source and sink of access requests.
#[async_trait]
pub trait AccessRequestStore: Send + Sync {
    /// Pending requests, newest first.
    async fn list_pending(&self) -> Result<Vec<AccessRequest>, StoreError>;

    async fn get(&self, id: AccessRequestId) -> Result<Option<AccessRequest>, StoreError>;

    /// Record the final decision list for a pending request.
    ///
    /// On success the request leaves the pending queue and the approved roles
    /// are added to the applicant's grants.
    async fn persist_decisions(
        &self,
        id: AccessRequestId,
        decisions: &[ResolvedDecision],
    ) -> Result<(), StoreError>;
}

/// Per-user granted roles, as recorded by resolved requests.
#[async_trait]
pub trait RoleGrantDirectory: Send + Sync {
    async fn granted_roles(&self, user: UserId) -> Result<GrantedRoleSet, StoreError>;

    /// Returns `true` if the user held the role.
    async fn revoke_role(&self, user: UserId, role: Role) -> Result<bool, StoreError>;
}
