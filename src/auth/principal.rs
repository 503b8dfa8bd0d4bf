//! Principal abstraction: "who is making the request".
//!
//! A [`Principal`] is handed to the pipeline by the authentication
//! collaborator after credential verification. The core never inspects
//! tokens itself and never mutates a principal; one is constructed per
//! authenticated request and dropped when the response is written.

use std::collections::BTreeSet;

/// Role token granted full administrative access.
pub const ROLE_ADMIN: &str = "ADMIN";

/// Role token granted to regular users.
pub const ROLE_USER: &str = "USER";

/// The authenticated actor making a request.
///
/// Invariants (enforced at configuration load, before any principal is
/// built): the username is non-empty and the role set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    username: String,
    roles: BTreeSet<String>,
}

impl Principal {
    pub fn new(username: impl Into<String>, roles: impl IntoIterator<Item = String>) -> Self {
        Self {
            username: username.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Check if the principal holds a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Check if the principal holds at least one of the listed roles.
    pub fn has_any_role<'a>(&self, roles: impl IntoIterator<Item = &'a str>) -> bool {
        roles.into_iter().any(|r| self.has_role(r))
    }

    /// Check if the principal holds every listed role.
    pub fn has_all_roles<'a>(&self, roles: impl IntoIterator<Item = &'a str>) -> bool {
        roles.into_iter().all(|r| self.has_role(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(roles: &[&str]) -> Principal {
        Principal::new("alice", roles.iter().map(|r| r.to_string()))
    }

    #[test]
    fn test_has_role() {
        let p = principal(&[ROLE_USER]);
        assert!(p.has_role(ROLE_USER));
        assert!(!p.has_role(ROLE_ADMIN));
    }

    #[test]
    fn test_has_any_role() {
        let p = principal(&[ROLE_USER]);
        assert!(p.has_any_role([ROLE_USER, ROLE_ADMIN]));
        assert!(!p.has_any_role([ROLE_ADMIN]));
    }

    #[test]
    fn test_has_all_roles() {
        let p = principal(&[ROLE_USER, ROLE_ADMIN]);
        assert!(p.has_all_roles([ROLE_USER, ROLE_ADMIN]));
        assert!(!principal(&[ROLE_USER]).has_all_roles([ROLE_USER, ROLE_ADMIN]));
    }

    #[test]
    fn test_duplicate_roles_collapse() {
        let p = principal(&[ROLE_USER, ROLE_USER]);
        assert_eq!(p.roles().len(), 1);
    }
}
