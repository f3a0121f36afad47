//! Access request aggregate (event-sourced).
//!
//! An access request is created by self-registration and resolved exactly once,
//! when an administrator records a decision for every requested role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutoria_auth::{GrantedRoleSet, Role};
use tutoria_core::{AccessRequestId, Aggregate, AggregateRoot, DomainError, UserId};
use tutoria_events::Event;

use crate::{Decision, ResolvedDecision, RoleDecision};

// ─────────────────────────────────────────────────────────────────────────────
// Request Status
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting in the review queue.
    #[default]
    Pending,
    /// Every requested role has a decision; no further mutation allowed.
    Resolved,
}

impl core::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "Pending"),
            RequestStatus::Resolved => write!(f, "Resolved"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Access Request Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// Access request aggregate.
///
/// # Invariants
/// - `requested_roles` is non-empty and duplicate-free.
/// - At most one decision per requested role; every decided role is requested.
/// - The request is `Resolved` iff every requested role is decided.
/// - Identity fields and `created_at` never change after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    id: AccessRequestId,
    applicant: UserId,
    first_name: String,
    last_name: String,
    email: String,
    requested_roles: Vec<Role>,
    decisions: Vec<RoleDecision>,
    status: RequestStatus,
    created_at: DateTime<Utc>,
    version: u64,
    created: bool,
}

impl AccessRequest {
    pub fn empty(id: AccessRequestId) -> Self {
        Self {
            id,
            applicant: UserId::default(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            requested_roles: Vec::new(),
            decisions: Vec::new(),
            status: RequestStatus::Pending,
            created_at: DateTime::<Utc>::default(),
            version: 0,
            created: false,
        }
    }

    /// Create a pending request from a self-registration.
    pub fn submit(cmd: SubmitAccessRequest) -> Result<Self, DomainError> {
        let mut request = Self::empty(cmd.request_id);
        let command = AccessRequestCommand::Submit(cmd);
        for event in request.handle(&command)? {
            request.apply(&event);
        }
        Ok(request)
    }

    /// Rebuild a request from stored state, possibly with partial decisions.
    ///
    /// Validates the same invariants as the command path. Status is derived
    /// from the decisions.
    pub fn restore(
        cmd: SubmitAccessRequest,
        decisions: Vec<RoleDecision>,
    ) -> Result<Self, DomainError> {
        let mut request = Self::submit(cmd)?;

        let mut seen: Vec<Role> = Vec::with_capacity(decisions.len());
        for d in &decisions {
            if !request.requested_roles.contains(&d.role) {
                return Err(DomainError::invariant(format!(
                    "decision for role '{}' which was not requested",
                    d.role
                )));
            }
            if seen.contains(&d.role) {
                return Err(DomainError::invariant(format!(
                    "duplicate decision for role '{}'",
                    d.role
                )));
            }
            seen.push(d.role);
        }

        request.decisions = decisions;
        if request.all_decided() {
            request.status = RequestStatus::Resolved;
        }
        Ok(request)
    }

    pub fn applicant(&self) -> UserId {
        self.applicant
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn requested_roles(&self) -> &[Role] {
        &self.requested_roles
    }

    pub fn decisions(&self) -> &[RoleDecision] {
        &self.decisions
    }

    /// Recorded decision for `role`, if any.
    pub fn decision_for(&self, role: Role) -> Option<Decision> {
        self.decisions
            .iter()
            .find(|d| d.role == role)
            .map(|d| d.decision)
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Roles whose recorded decision is `Approved`.
    pub fn granted_roles(&self) -> GrantedRoleSet {
        self.decisions
            .iter()
            .filter(|d| d.decision == Decision::Approved)
            .map(|d| d.role)
            .collect()
    }

    fn all_decided(&self) -> bool {
        self.requested_roles
            .iter()
            .all(|role| self.decision_for(*role).is_some_and(Decision::is_decided))
    }

    fn ensure_request_id(&self, request_id: AccessRequestId) -> Result<(), DomainError> {
        if self.id != request_id {
            return Err(DomainError::invariant("request_id mismatch"));
        }
        Ok(())
    }
}

impl AggregateRoot for AccessRequest {
    type Id = AccessRequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Command issued by self-registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAccessRequest {
    pub request_id: AccessRequestId,
    pub applicant: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub requested_roles: Vec<Role>,
    pub occurred_at: DateTime<Utc>,
}

/// Command that finalizes a request with one decision per requested role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDecisions {
    pub request_id: AccessRequestId,
    pub decisions: Vec<ResolvedDecision>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccessRequestCommand {
    Submit(SubmitAccessRequest),
    RecordDecisions(RecordDecisions),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequestSubmitted {
    pub request_id: AccessRequestId,
    pub applicant: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub requested_roles: Vec<Role>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionsRecorded {
    pub request_id: AccessRequestId,
    pub decisions: Vec<ResolvedDecision>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessRequestEvent {
    Submitted(AccessRequestSubmitted),
    DecisionsRecorded(DecisionsRecorded),
}

impl Event for AccessRequestEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccessRequestEvent::Submitted(_) => "access.request.submitted",
            AccessRequestEvent::DecisionsRecorded(_) => "access.request.decisions_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AccessRequestEvent::Submitted(e) => e.occurred_at,
            AccessRequestEvent::DecisionsRecorded(e) => e.occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for AccessRequest {
    type Command = AccessRequestCommand;
    type Event = AccessRequestEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccessRequestEvent::Submitted(e) => self.apply_submitted(e),
            AccessRequestEvent::DecisionsRecorded(e) => self.apply_decisions_recorded(e),
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AccessRequestCommand::Submit(cmd) => self.handle_submit(cmd),
            AccessRequestCommand::RecordDecisions(cmd) => self.handle_record_decisions(cmd),
        }
    }
}

impl AccessRequest {
    fn handle_submit(&self, cmd: &SubmitAccessRequest) -> Result<Vec<AccessRequestEvent>, DomainError> {
        if self.created {
            return Err(DomainError::invariant("access request already exists"));
        }
        self.ensure_request_id(cmd.request_id)?;

        if cmd.first_name.trim().is_empty() || cmd.last_name.trim().is_empty() {
            return Err(DomainError::validation("first and last name cannot be empty"));
        }

        if cmd.email.trim().is_empty() || !cmd.email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        if cmd.requested_roles.is_empty() {
            return Err(DomainError::validation("at least one role must be requested"));
        }

        for (i, role) in cmd.requested_roles.iter().enumerate() {
            if cmd.requested_roles[..i].contains(role) {
                return Err(DomainError::validation(format!("role '{role}' requested twice")));
            }
        }

        Ok(vec![AccessRequestEvent::Submitted(AccessRequestSubmitted {
            request_id: cmd.request_id,
            applicant: cmd.applicant,
            first_name: cmd.first_name.trim().to_string(),
            last_name: cmd.last_name.trim().to_string(),
            email: cmd.email.trim().to_lowercase(),
            requested_roles: cmd.requested_roles.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_decisions(
        &self,
        cmd: &RecordDecisions,
    ) -> Result<Vec<AccessRequestEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_request_id(cmd.request_id)?;

        if self.status == RequestStatus::Resolved {
            return Err(DomainError::invariant("access request already resolved"));
        }

        // One decision per requested role, in requested order.
        let roles: Vec<Role> = cmd.decisions.iter().map(|d| d.role).collect();
        if roles != self.requested_roles {
            return Err(DomainError::invariant(
                "decisions must cover every requested role in request order",
            ));
        }

        Ok(vec![AccessRequestEvent::DecisionsRecorded(DecisionsRecorded {
            request_id: cmd.request_id,
            decisions: cmd.decisions.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn apply_submitted(&mut self, e: &AccessRequestSubmitted) {
        self.id = e.request_id;
        self.applicant = e.applicant;
        self.first_name = e.first_name.clone();
        self.last_name = e.last_name.clone();
        self.email = e.email.clone();
        self.requested_roles = e.requested_roles.clone();
        self.decisions = Vec::new();
        self.status = RequestStatus::Pending;
        self.created_at = e.occurred_at;
        self.created = true;
    }

    fn apply_decisions_recorded(&mut self, e: &DecisionsRecorded) {
        self.decisions = e
            .decisions
            .iter()
            .map(|d| RoleDecision::new(d.role, Decision::from_approved(d.approved)))
            .collect();
        self.status = RequestStatus::Resolved;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
