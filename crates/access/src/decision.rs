//! Per-role decision values.

use serde::{Deserialize, Serialize};

use tutoria_auth::Role;

/// Administrator decision for a single requested role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    #[default]
    Undecided,
    Approved,
    Rejected,
}

impl Decision {
    pub fn from_approved(approved: bool) -> Self {
        if approved {
            Decision::Approved
        } else {
            Decision::Rejected
        }
    }

    pub fn is_decided(self) -> bool {
        !matches!(self, Decision::Undecided)
    }

    /// `Some(true)` for approved, `Some(false)` for rejected.
    pub fn approved(self) -> Option<bool> {
        match self {
            Decision::Approved => Some(true),
            Decision::Rejected => Some(false),
            Decision::Undecided => None,
        }
    }

    /// Apply an approve/reject click.
    ///
    /// Repeating the current choice reverts to `Undecided`; the opposite choice
    /// overwrites.
    pub fn toggle(self, approved: bool) -> Self {
        let target = Decision::from_approved(approved);
        if self == target {
            Decision::Undecided
        } else {
            target
        }
    }
}

/// Decision state of one requested role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDecision {
    pub role: Role,
    pub decision: Decision,
}

impl RoleDecision {
    pub fn new(role: Role, decision: Decision) -> Self {
        Self { role, decision }
    }

    pub fn undecided(role: Role) -> Self {
        Self::new(role, Decision::Undecided)
    }
}
