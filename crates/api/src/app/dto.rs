use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutoria_access::{AccessRequest, RequestStatus, ResolvedDecision, ResolvedRequest, ReviewDraft, RoleDecision};
use tutoria_auth::{BadgeTone, GrantedRoleSet, Role};
use tutoria_core::{AccessRequestId, AggregateRoot, UserId};
use tutoria_navigation::{NavigationModel, NavigationState, SubTabId, SubTabSpec, Tab};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SelectTabRequest {
    pub tab: Tab,
}

#[derive(Debug, Deserialize)]
pub struct SelectSubTabRequest {
    pub sub_tab: SubTabId,
}

#[derive(Debug, Deserialize)]
pub struct RoleDecisionRequest {
    pub approved: bool,
}

// -------------------------
// Response DTOs
// -------------------------

/// A role rendered as a chip.
#[derive(Debug, Serialize)]
pub struct RoleBadge {
    pub role: Role,
    pub label: &'static str,
    pub badge: BadgeTone,
}

impl From<Role> for RoleBadge {
    fn from(role: Role) -> Self {
        let style = role.style();
        Self {
            role,
            label: style.label,
            badge: style.badge,
        }
    }
}

pub fn badges(granted: &GrantedRoleSet) -> Vec<RoleBadge> {
    granted.iter().map(RoleBadge::from).collect()
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub roles: Vec<RoleBadge>,
}

#[derive(Debug, Serialize)]
pub struct TabView {
    pub tab: Tab,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct NavigationView {
    pub state: NavigationState,
    pub visible_tabs: Vec<TabView>,
    pub sub_tabs: Vec<SubTabSpec>,
}

impl From<&NavigationModel> for NavigationView {
    fn from(model: &NavigationModel) -> Self {
        Self {
            state: model.state().clone(),
            visible_tabs: model
                .visible_tabs()
                .into_iter()
                .map(|tab| TabView {
                    tab,
                    label: tab.label(),
                })
                .collect(),
            sub_tabs: model.sub_tabs().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessRequestView {
    pub id: AccessRequestId,
    pub applicant: UserId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub requested_roles: Vec<RoleBadge>,
    pub decisions: Vec<RoleDecision>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&AccessRequest> for AccessRequestView {
    fn from(request: &AccessRequest) -> Self {
        Self {
            id: *request.id(),
            applicant: request.applicant(),
            first_name: request.first_name().to_string(),
            last_name: request.last_name().to_string(),
            full_name: request.full_name(),
            email: request.email().to_string(),
            requested_roles: request.requested_roles().iter().copied().map(RoleBadge::from).collect(),
            decisions: request.decisions().to_vec(),
            status: request.status(),
            created_at: request.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DraftView {
    pub request_id: AccessRequestId,
    pub entries: Vec<RoleDecision>,
    pub undecided: Vec<Role>,
    pub complete: bool,
}

impl From<&ReviewDraft> for DraftView {
    fn from(draft: &ReviewDraft) -> Self {
        Self {
            request_id: draft.request_id(),
            entries: draft.entries().to_vec(),
            undecided: draft.undecided_roles(),
            complete: draft.is_complete(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResolvedView {
    pub request_id: AccessRequestId,
    pub applicant: UserId,
    pub decisions: Vec<ResolvedDecision>,
    pub granted: GrantedRoleSet,
}

impl From<ResolvedRequest> for ResolvedView {
    fn from(resolved: ResolvedRequest) -> Self {
        Self {
            granted: resolved.granted_roles(),
            request_id: resolved.request_id,
            applicant: resolved.applicant,
            decisions: resolved.decisions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevokeRoleResponse {
    pub user_id: UserId,
    pub role: Role,
    pub revoked: bool,
}
