//! Administrator review of a pending access request.
//!
//! The flow is `begin_review` → any number of `set_role_decision` →
//! `validate_complete` → `apply_decisions`. Every step is pure: the draft is a
//! value, and persisting the resolved request is the caller's job.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tutoria_auth::{GrantedRoleSet, Role};
use tutoria_core::{AccessRequestId, AggregateRoot, UserId};

use crate::{AccessRequest, Decision, RoleDecision};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    /// The role is not part of the request. Indicates a caller or data bug.
    #[error("role '{role}' was not requested by access request {request_id}")]
    InvalidRole {
        request_id: AccessRequestId,
        role: Role,
    },

    /// At least one requested role is still undecided.
    #[error("every requested role needs a decision; undecided: {}", join_roles(.undecided))]
    IncompleteDecision { undecided: Vec<Role> },

    #[error("draft was opened for access request {draft}, not {request}")]
    DraftMismatch {
        draft: AccessRequestId,
        request: AccessRequestId,
    },

    #[error("access request {0} is already resolved")]
    AlreadyResolved(AccessRequestId),
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Review Draft
// ─────────────────────────────────────────────────────────────────────────────

/// In-progress decisions for one access request, in requested-role order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    request_id: AccessRequestId,
    entries: Vec<RoleDecision>,
}

impl ReviewDraft {
    pub fn request_id(&self) -> AccessRequestId {
        self.request_id
    }

    pub fn entries(&self) -> &[RoleDecision] {
        &self.entries
    }

    /// Current decision for `role`, or `None` if the role is not in the draft.
    pub fn decision(&self, role: Role) -> Option<Decision> {
        self.entries
            .iter()
            .find(|e| e.role == role)
            .map(|e| e.decision)
    }

    pub fn undecided_roles(&self) -> Vec<Role> {
        self.entries
            .iter()
            .filter(|e| !e.decision.is_decided())
            .map(|e| e.role)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| e.decision.is_decided())
    }

    /// Toggle-style decision update; see [`set_role_decision`].
    pub fn set_role_decision(mut self, role: Role, approved: bool) -> Result<Self, ApprovalError> {
        let Some(entry) = self.entries.iter_mut().find(|e| e.role == role) else {
            tracing::error!(
                request_id = %self.request_id,
                role = %role,
                "decision for a role outside the request"
            );
            return Err(ApprovalError::InvalidRole {
                request_id: self.request_id,
                role,
            });
        };
        entry.decision = entry.decision.toggle(approved);
        Ok(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolved Request
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDecision {
    pub role: Role,
    pub approved: bool,
}

/// Final decisions for a request, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRequest {
    pub request_id: AccessRequestId,
    pub applicant: UserId,
    pub decisions: Vec<ResolvedDecision>,
}

impl ResolvedRequest {
    pub fn granted_roles(&self) -> GrantedRoleSet {
        self.decisions
            .iter()
            .filter(|d| d.approved)
            .map(|d| d.role)
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Seed a draft from a request.
///
/// Roles with a recorded decision start from it; the rest start `Undecided`.
pub fn begin_review(request: &AccessRequest) -> ReviewDraft {
    let entries = request
        .requested_roles()
        .iter()
        .map(|role| RoleDecision::new(*role, request.decision_for(*role).unwrap_or_default()))
        .collect();

    ReviewDraft {
        request_id: *request.id(),
        entries,
    }
}

/// Record an approve (`true`) or reject (`false`) click for `role`.
///
/// Repeating the current choice reverts the role to `Undecided`; the opposite
/// choice overwrites. Fails with [`ApprovalError::InvalidRole`] for roles the
/// request did not ask for.
pub fn set_role_decision(
    draft: ReviewDraft,
    role: Role,
    approved: bool,
) -> Result<ReviewDraft, ApprovalError> {
    draft.set_role_decision(role, approved)
}

/// Fail unless every role in `requested_roles` is decided in `draft`.
pub fn validate_complete(draft: &ReviewDraft, requested_roles: &[Role]) -> Result<(), ApprovalError> {
    let undecided: Vec<Role> = requested_roles
        .iter()
        .copied()
        .filter(|role| !draft.decision(*role).is_some_and(Decision::is_decided))
        .collect();

    if undecided.is_empty() {
        Ok(())
    } else {
        Err(ApprovalError::IncompleteDecision { undecided })
    }
}

/// Turn a complete draft into the final decision list, in requested-role order.
pub fn apply_decisions(
    request: &AccessRequest,
    draft: &ReviewDraft,
) -> Result<ResolvedRequest, ApprovalError> {
    let request_id = *request.id();
    if draft.request_id != request_id {
        return Err(ApprovalError::DraftMismatch {
            draft: draft.request_id,
            request: request_id,
        });
    }
    if !request.is_pending() {
        return Err(ApprovalError::AlreadyResolved(request_id));
    }

    validate_complete(draft, request.requested_roles())?;

    let decisions = request
        .requested_roles()
        .iter()
        .filter_map(|role| {
            draft
                .decision(*role)
                .and_then(Decision::approved)
                .map(|approved| ResolvedDecision {
                    role: *role,
                    approved,
                })
        })
        .collect();

    Ok(ResolvedRequest {
        request_id,
        applicant: request.applicant(),
        decisions,
    })
}
