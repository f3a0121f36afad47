use serde::Serialize;

use tutoria_auth::{GrantedRoleSet, Role};

use crate::Tab;

/// Home-page shortcut into a role tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickAccessCard {
    pub role: Role,
    pub target: Tab,
    pub title: &'static str,
    pub description: &'static str,
    pub action_label: &'static str,
}

impl QuickAccessCard {
    pub const fn for_role(role: Role) -> Self {
        let (title, description, action_label) = match role {
            Role::Administrator => (
                "Administration Panel",
                "Manage users, assignments and schedules, and generate tutoring system reports.",
                "Go to Administration",
            ),
            Role::Tutor => (
                "Tutoring Panel",
                "Record tutoring sessions, follow up with your tutees and manage your activities.",
                "Go to Tutoring",
            ),
            Role::Verifier => (
                "Evaluation Panel",
                "Verify and evaluate the tutoring sessions held by assigned tutors.",
                "Go to Evaluation",
            ),
        };
        let target = match role {
            Role::Administrator => Tab::Administrator,
            Role::Tutor => Tab::Tutor,
            Role::Verifier => Tab::Verifier,
        };
        Self {
            role,
            target,
            title,
            description,
            action_label,
        }
    }

    /// One card per granted role, canonical order.
    pub fn for_granted(granted: &GrantedRoleSet) -> Vec<Self> {
        granted.iter().map(Self::for_role).collect()
    }
}
