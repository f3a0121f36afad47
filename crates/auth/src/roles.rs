use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A portal role.
///
/// The declaration order is the canonical display order (navigation tabs,
/// quick-access cards, badges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "administrador")]
    Administrator,
    Tutor,
    #[serde(alias = "verificador")]
    Verifier,
}

/// Badge color token used when a role is rendered as a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Primary,
    Secondary,
    Accent,
}

/// Static presentation entry for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleStyle {
    pub label: &'static str,
    pub badge: BadgeTone,
}

impl Role {
    /// All roles in canonical order.
    pub const ALL: [Role; 3] = [Role::Administrator, Role::Tutor, Role::Verifier];

    /// Stable wire identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Tutor => "tutor",
            Role::Verifier => "verifier",
        }
    }

    pub const fn style(self) -> RoleStyle {
        match self {
            Role::Administrator => RoleStyle {
                label: "Administrator",
                badge: BadgeTone::Secondary,
            },
            Role::Tutor => RoleStyle {
                label: "Tutor",
                badge: BadgeTone::Accent,
            },
            Role::Verifier => RoleStyle {
                label: "Verifier",
                badge: BadgeTone::Primary,
            },
        }
    }

    pub const fn label(self) -> &'static str {
        self.style().label
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    /// Accepts the wire identifiers plus the Spanish names used by the
    /// registration form, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "administrator" | "administrador" => Ok(Role::Administrator),
            "tutor" => Ok(Role::Tutor),
            "verifier" | "verificador" => Ok(Role::Verifier),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}
