//! Role requirement rules and the access guard.
//!
//! The guard is a pure function of `(roles, path)`. It never inspects
//! tokens or credentials; "unauthenticated" is detected earlier in the
//! pipeline by the authentication middleware.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::PolicyStore;
use crate::{
    auth::Principal,
    config::{AccessRuleConfig, ConfigError},
    error::ApiError,
};

/// How a rule's role set is evaluated against a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The principal must hold at least one listed role.
    #[default]
    Any,
    /// The principal must hold every listed role.
    All,
}

/// A path-prefix role requirement.
#[derive(Debug, Clone)]
pub struct AccessRule {
    prefix: String,
    roles: BTreeSet<String>,
    mode: MatchMode,
}

impl AccessRule {
    pub(crate) fn from_config(rule: &AccessRuleConfig) -> Result<Self, ConfigError> {
        if !rule.prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "access rule prefix must start with '/': {:?}",
                rule.prefix
            )));
        }
        if rule.roles.is_empty() {
            return Err(ConfigError::Validation(format!(
                "access rule for prefix {:?} has an empty role set",
                rule.prefix
            )));
        }
        if rule.roles.iter().any(|r| r.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "access rule for prefix {:?} contains a blank role token",
                rule.prefix
            )));
        }

        Ok(Self {
            prefix: rule.prefix.clone(),
            roles: rule.roles.iter().cloned().collect(),
            mode: rule.mode,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Evaluate the rule's role requirement against a principal.
    pub fn is_satisfied_by(&self, principal: &Principal) -> bool {
        let roles = self.roles.iter().map(String::as_str);
        match self.mode {
            MatchMode::Any => principal.has_any_role(roles),
            MatchMode::All => principal.has_all_roles(roles),
        }
    }
}

/// Check the role requirement for `path` against an authenticated principal.
///
/// Paths without a rule are public: any authenticated principal passes.
pub fn check(store: &PolicyStore, principal: &Principal, path: &str) -> Result<(), ApiError> {
    match store.resolve_access_rule(path) {
        None => Ok(()),
        Some(rule) if rule.is_satisfied_by(principal) => Ok(()),
        Some(rule) => {
            tracing::debug!(
                username = %principal.username(),
                path,
                rule_prefix = rule.prefix(),
                "role check failed"
            );
            Err(ApiError::forbidden("Access forbidden: insufficient role"))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::config::AppConfig;

    fn store() -> PolicyStore {
        PolicyStore::from_config(&AppConfig::default()).unwrap()
    }

    fn principal(roles: &[&str]) -> Principal {
        Principal::new("test-user", roles.iter().map(|r| r.to_string()))
    }

    #[rstest]
    #[case(&["USER"], "/api/v1/user/profile", true)]
    #[case(&["ADMIN"], "/api/v1/user/profile", true)]
    #[case(&["USER", "ADMIN"], "/api/v1/user/profile", true)]
    #[case(&["USER"], "/api/v1/admin/dashboard", false)]
    #[case(&["ADMIN"], "/api/v1/admin/dashboard", true)]
    #[case(&["USER", "ADMIN"], "/api/v1/admin/users", true)]
    #[case(&["AUDITOR"], "/api/v1/user/profile", false)]
    fn test_default_rules(
        #[case] roles: &[&str],
        #[case] path: &str,
        #[case] expect_allowed: bool,
    ) {
        let result = check(&store(), &principal(roles), path);
        assert_eq!(result.is_ok(), expect_allowed, "{roles:?} on {path}");
    }

    #[test]
    fn test_unruled_path_is_public_to_authenticated() {
        let result = check(&store(), &principal(&["NOBODY"]), "/api/v1/status");
        assert!(result.is_ok());
    }

    #[test]
    fn test_denial_is_forbidden() {
        let err = check(&store(), &principal(&["USER"]), "/api/v1/admin/users").unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_all_mode_requires_every_role() {
        let config = AppConfig::from_str(
            r#"
            [[access.rules]]
            prefix = "/api/v1/ops"
            roles = ["ADMIN", "OPERATOR"]
            mode = "all"
        "#,
        )
        .unwrap();
        let store = PolicyStore::from_config(&config).unwrap();

        assert!(check(&store, &principal(&["ADMIN"]), "/api/v1/ops/restart").is_err());
        assert!(check(&store, &principal(&["ADMIN", "OPERATOR"]), "/api/v1/ops/restart").is_ok());
    }

    #[test]
    fn test_empty_role_set_rejected_at_construction() {
        let rule = AccessRuleConfig {
            prefix: "/api/v1/x".to_string(),
            roles: vec![],
            mode: MatchMode::Any,
        };
        assert!(AccessRule::from_config(&rule).is_err());
    }
}
