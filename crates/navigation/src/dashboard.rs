use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use tutoria_auth::GrantedRoleSet;

use crate::model::tab_reachable;
use crate::{NavigationConfig, NavigationModel, NavigationState, QuickAccessCard, SubTabId, Tab};

/// The navigation state no longer matches the user's roles or the config.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationConsistencyError {
    #[error("active tab '{0}' is not reachable with the current roles")]
    UnreachableTab(Tab),

    #[error("active sub-tab '{sub_tab}' is not configured for tab '{tab}'")]
    UnknownSubTab { tab: Tab, sub_tab: SubTabId },
}

/// Content key of a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelKey {
    pub tab: Tab,
    pub sub_tab: Option<SubTabId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisiblePanelDescriptor {
    pub panel: PanelKey,
    /// Role label shown in the welcome banner.
    pub welcome_label: Option<&'static str>,
    /// Only populated on the home panel.
    pub quick_access: Vec<QuickAccessCard>,
}

#[derive(Debug, Clone)]
pub struct DashboardController {
    config: Arc<NavigationConfig>,
}

impl DashboardController {
    pub fn new(config: Arc<NavigationConfig>) -> Self {
        Self { config }
    }

    pub fn render(
        &self,
        granted: &GrantedRoleSet,
        state: &NavigationState,
    ) -> Result<VisiblePanelDescriptor, NavigationConsistencyError> {
        let tab = state.active_tab;
        if !tab_reachable(granted, tab) {
            return Err(NavigationConsistencyError::UnreachableTab(tab));
        }
        if let Some(sub_tab) = &state.active_sub_tab {
            if !self.config.has_sub_tab(tab, sub_tab) {
                return Err(NavigationConsistencyError::UnknownSubTab {
                    tab,
                    sub_tab: sub_tab.clone(),
                });
            }
        }

        Ok(self.describe(granted, tab, state.active_sub_tab.clone()))
    }

    /// Render the session's panel, resetting the model to home if its state
    /// has drifted from the granted roles.
    pub fn render_session(&self, model: &mut NavigationModel) -> VisiblePanelDescriptor {
        match self.render(model.granted(), model.state()) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                tracing::warn!(error = %err, "navigation state drifted; resetting to home");
                model.reset();
                self.describe(model.granted(), Tab::Home, None)
            }
        }
    }

    fn describe(
        &self,
        granted: &GrantedRoleSet,
        tab: Tab,
        sub_tab: Option<SubTabId>,
    ) -> VisiblePanelDescriptor {
        let (welcome_label, quick_access) = match tab.role() {
            Some(role) => (Some(role.label()), Vec::new()),
            None => (
                granted.iter().next().map(|r| r.label()),
                QuickAccessCard::for_granted(granted),
            ),
        };

        VisiblePanelDescriptor {
            panel: PanelKey { tab, sub_tab },
            welcome_label,
            quick_access,
        }
    }
}
