use core::str::FromStr;
use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tutoria_auth::Role;

/// Top-level portal tab.
///
/// `Home` is always reachable; every other tab mirrors one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[serde(alias = "inicio")]
    Home,
    #[serde(alias = "administrador")]
    Administrator,
    Tutor,
    #[serde(alias = "verificador")]
    Verifier,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::Administrator, Tab::Tutor, Tab::Verifier];

    /// The role gating this tab, `None` for home.
    pub const fn role(self) -> Option<Role> {
        match self {
            Tab::Home => None,
            Tab::Administrator => Some(Role::Administrator),
            Tab::Tutor => Some(Role::Tutor),
            Tab::Verifier => Some(Role::Verifier),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Tab::Home => "home",
            Tab::Administrator => "administrator",
            Tab::Tutor => "tutor",
            Tab::Verifier => "verifier",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Tab::Home => "HOME",
            Tab::Administrator => "ADMINISTRATOR",
            Tab::Tutor => "TUTOR",
            Tab::Verifier => "VERIFIER",
        }
    }

    pub fn is_home(self) -> bool {
        matches!(self, Tab::Home)
    }
}

impl From<Role> for Tab {
    fn from(role: Role) -> Self {
        match role {
            Role::Administrator => Tab::Administrator,
            Role::Tutor => Tab::Tutor,
            Role::Verifier => Tab::Verifier,
        }
    }
}

impl core::fmt::Display for Tab {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown tab '{0}'")]
pub struct TabParseError(pub String);

impl FromStr for Tab {
    type Err = TabParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" | "inicio" => Ok(Tab::Home),
            other => other
                .parse::<Role>()
                .map(Tab::from)
                .map_err(|_| TabParseError(s.to_string())),
        }
    }
}

/// Sub-tab identifier, e.g. `"validate-users"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubTabId(Cow<'static, str>);

impl SubTabId {
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SubTabId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for SubTabId {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for SubTabId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
