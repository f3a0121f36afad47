//! `tutoria-navigation` — role-gated portal navigation.
//!
//! A user always sees the home tab plus one tab per granted role. Each tab has
//! an ordered (possibly empty) list of sub-tabs supplied by an injected
//! [`NavigationConfig`]. [`DashboardController`] resolves the active
//! `(tab, sub_tab)` pair into the panel to render.

pub mod config;
pub mod dashboard;
pub mod model;
pub mod quick_access;
pub mod tab;

pub use config::{NavigationConfig, SubTabSpec};
pub use dashboard::{DashboardController, NavigationConsistencyError, PanelKey, VisiblePanelDescriptor};
pub use model::{NavigationError, NavigationModel, NavigationState};
pub use quick_access::QuickAccessCard;
pub use tab::{SubTabId, Tab, TabParseError};
