use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tutoria_auth::GrantedRoleSet;

use crate::{NavigationConfig, SubTabId, SubTabSpec, Tab};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("tab '{0}' is not available to the current user")]
    UnauthorizedTab(Tab),

    #[error("sub-tab '{sub_tab}' does not belong to tab '{tab}'")]
    InvalidSubTab { tab: Tab, sub_tab: SubTabId },
}

/// Which tab and sub-tab are currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub active_tab: Tab,
    pub active_sub_tab: Option<SubTabId>,
}

impl NavigationState {
    pub fn home() -> Self {
        Self {
            active_tab: Tab::Home,
            active_sub_tab: None,
        }
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::home()
    }
}

/// Navigation state of one session, gated by the user's granted roles.
#[derive(Debug, Clone)]
pub struct NavigationModel {
    config: Arc<NavigationConfig>,
    granted: GrantedRoleSet,
    state: NavigationState,
}

impl NavigationModel {
    /// Starts on `{home, none}`.
    pub fn new(config: Arc<NavigationConfig>, granted: GrantedRoleSet) -> Self {
        Self {
            config,
            granted,
            state: NavigationState::home(),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn granted(&self) -> &GrantedRoleSet {
        &self.granted
    }

    pub fn config(&self) -> &Arc<NavigationConfig> {
        &self.config
    }

    pub fn is_reachable(&self, tab: Tab) -> bool {
        tab_reachable(&self.granted, tab)
    }

    /// Home followed by one tab per granted role, in canonical order.
    pub fn visible_tabs(&self) -> Vec<Tab> {
        Tab::ALL
            .into_iter()
            .filter(|t| self.is_reachable(*t))
            .collect()
    }

    /// Sub-tabs of the active tab.
    pub fn sub_tabs(&self) -> &[SubTabSpec] {
        self.config.sub_tabs(self.state.active_tab)
    }

    pub fn select_tab(&mut self, tab: Tab) -> Result<&NavigationState, NavigationError> {
        if !self.is_reachable(tab) {
            return Err(NavigationError::UnauthorizedTab(tab));
        }
        self.state = NavigationState {
            active_tab: tab,
            active_sub_tab: self.config.first_sub_tab(tab).cloned(),
        };
        Ok(&self.state)
    }

    pub fn select_sub_tab(&mut self, sub_tab: SubTabId) -> Result<&NavigationState, NavigationError> {
        let tab = self.state.active_tab;
        if !self.config.has_sub_tab(tab, &sub_tab) {
            return Err(NavigationError::InvalidSubTab { tab, sub_tab });
        }
        self.state.active_sub_tab = Some(sub_tab);
        Ok(&self.state)
    }

    /// Install a new granted set. Returns `true` if the active tab was lost
    /// and the state was forced back to `{home, none}`.
    pub fn on_roles_changed(&mut self, granted: GrantedRoleSet) -> bool {
        self.granted = granted;
        if self.is_reachable(self.state.active_tab) {
            return false;
        }
        tracing::debug!(tab = %self.state.active_tab, "active tab revoked; returning home");
        self.reset();
        true
    }

    pub fn reset(&mut self) {
        self.state = NavigationState::home();
    }
}

pub(crate) fn tab_reachable(granted: &GrantedRoleSet, tab: Tab) -> bool {
    match tab.role() {
        None => true,
        Some(role) => granted.contains(role),
    }
}
