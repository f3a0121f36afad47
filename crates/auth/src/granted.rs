use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Role;

/// The set of roles a user currently holds.
///
/// Iteration follows canonical role order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantedRoleSet(BTreeSet<Role>);

impl GrantedRoleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn remove(&mut self, role: Role) -> bool {
        self.0.remove(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for GrantedRoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Role> for GrantedRoleSet {
    fn extend<T: IntoIterator<Item = Role>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl<const N: usize> From<[Role; N]> for GrantedRoleSet {
    fn from(value: [Role; N]) -> Self {
        value.into_iter().collect()
    }
}
