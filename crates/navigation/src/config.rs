use std::collections::BTreeMap;

use serde::Serialize;

use crate::{SubTabId, Tab};

/// One entry in a tab's sub-tab strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubTabSpec {
    pub id: SubTabId,
    pub label: &'static str,
}

impl SubTabSpec {
    pub const fn new(id: &'static str, label: &'static str) -> Self {
        Self {
            id: SubTabId::from_static(id),
            label,
        }
    }
}

/// Read-only mapping from tab to its ordered sub-tabs.
///
/// Tabs without an entry have no sub-tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationConfig {
    sub_tabs: BTreeMap<Tab, Vec<SubTabSpec>>,
}

impl NavigationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sub-tabs of `tab`. Later duplicates of an id are dropped.
    pub fn with_sub_tabs(mut self, tab: Tab, specs: impl IntoIterator<Item = SubTabSpec>) -> Self {
        let mut list: Vec<SubTabSpec> = Vec::new();
        for spec in specs {
            if !list.iter().any(|s| s.id == spec.id) {
                list.push(spec);
            }
        }
        self.sub_tabs.insert(tab, list);
        self
    }

    /// Sub-tab layout of the tutoring portal.
    pub fn portal_default() -> Self {
        Self::new()
            .with_sub_tabs(
                Tab::Administrator,
                [
                    SubTabSpec::new("validate-users", "Validate Users"),
                    SubTabSpec::new("assignments", "Assignments"),
                    SubTabSpec::new("schedules", "Schedules"),
                    SubTabSpec::new("reports", "Reports"),
                ],
            )
            .with_sub_tabs(
                Tab::Verifier,
                [
                    SubTabSpec::new("sessions-by-semester", "Sessions by Semester"),
                    SubTabSpec::new("sessions-by-student", "Sessions by Student"),
                    SubTabSpec::new("sessions-by-tutor", "Sessions by Tutor"),
                ],
            )
    }

    pub fn sub_tabs(&self, tab: Tab) -> &[SubTabSpec] {
        self.sub_tabs.get(&tab).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first_sub_tab(&self, tab: Tab) -> Option<&SubTabId> {
        self.sub_tabs(tab).first().map(|s| &s.id)
    }

    pub fn has_sub_tab(&self, tab: Tab, id: &SubTabId) -> bool {
        self.sub_tabs(tab).iter().any(|s| &s.id == id)
    }
}
