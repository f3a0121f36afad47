//! `tutoria-access` — access requests and the administrator approval workflow.
//!
//! A user self-registers with a set of requested roles; an administrator opens
//! a review draft, decides each role independently, and submits. The result is
//! the user's granted role set.

pub mod approval;
pub mod decision;
pub mod request;

pub use approval::{
    apply_decisions, begin_review, set_role_decision, validate_complete, ApprovalError,
    ResolvedDecision, ResolvedRequest, ReviewDraft,
};
pub use decision::{Decision, RoleDecision};
pub use request::{
    AccessRequest, AccessRequestCommand, AccessRequestEvent, AccessRequestSubmitted,
    DecisionsRecorded, RecordDecisions, RequestStatus, SubmitAccessRequest,
};
