//! access
//!
//! Who may run maintenance commands.
//!
//! Authorization is checked by the caller before an operation runs; the
//! operations themselves never re-check it.

use std::collections::BTreeSet;

use crate::core::types::Actor;

/// Message shown to actors who fail the staff check.
pub const STAFF_REQUIRED: &str = "Must be staff to perform this action.";

/// Authorization collaborator.
pub trait Authorizer {
    /// Whether `actor` may run maintenance commands.
    fn is_staff(&self, actor: &Actor) -> bool;
}

/// Staff list loaded from configuration.
///
/// An empty list denies everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffList {
    members: BTreeSet<String>,
}

impl StaffList {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}

impl Authorizer for StaffList {
    fn is_staff(&self, actor: &Actor) -> bool {
        self.members.contains(actor.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_are_staff() {
        let staff = StaffList::new(["ops", "escalations"]);
        assert!(staff.is_staff(&Actor::new("ops").unwrap()));
        assert!(!staff.is_staff(&Actor::new("student").unwrap()));
        assert_eq!(staff.members().collect::<Vec<_>>(), ["escalations", "ops"]);
    }

    #[test]
    fn empty_list_denies() {
        let staff = StaffList::default();
        assert!(staff.is_empty());
        assert!(!staff.is_staff(&Actor::new("ops").unwrap()));
    }

    #[test]
    fn match_is_exact() {
        let staff = StaffList::new(vec!["Ops".to_string()]);
        assert!(!staff.is_staff(&Actor::new("ops").unwrap()));
    }
}
