//! The process-wide policy store.
//!
//! Built once at startup from validated configuration, then shared via
//! `Arc` and read by every request without locking. Both lookup tables are
//! longest-prefix matched, but over separate tables: the CORS bindings and
//! the access rules are independent of one another.

use std::collections::BTreeMap;

use super::{AccessRule, CorsPolicy};
use crate::config::{AppConfig, ConfigError};

/// Immutable table of named CORS policies and path-to-role-requirement
/// rules.
#[derive(Debug)]
pub struct PolicyStore {
    profiles: BTreeMap<String, CorsPolicy>,
    /// Path-prefix to profile-name bindings, longest prefix first.
    cors_bindings: Vec<CorsBinding>,
    /// Access rules, longest prefix first.
    access_rules: Vec<AccessRule>,
}

#[derive(Debug)]
struct CorsBinding {
    prefix: String,
    profile: String,
}

impl PolicyStore {
    /// Build the store, validating every policy invariant. Fails fast with
    /// a descriptive error rather than starting with ambiguous policy.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let mut profiles = BTreeMap::new();
        for (name, profile) in &config.cors.profiles {
            profiles.insert(name.clone(), CorsPolicy::from_profile(name, profile)?);
        }

        let mut cors_bindings = Vec::with_capacity(config.cors.bindings.len());
        for binding in &config.cors.bindings {
            if !binding.prefix.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "cors binding prefix must start with '/': {:?}",
                    binding.prefix
                )));
            }
            if !profiles.contains_key(&binding.profile) {
                return Err(ConfigError::Validation(format!(
                    "cors binding for prefix {:?} references unknown profile {:?}",
                    binding.prefix, binding.profile
                )));
            }
            if cors_bindings
                .iter()
                .any(|b: &CorsBinding| b.prefix == binding.prefix)
            {
                return Err(ConfigError::Validation(format!(
                    "ambiguous cors bindings: prefix {:?} is bound twice",
                    binding.prefix
                )));
            }
            cors_bindings.push(CorsBinding {
                prefix: binding.prefix.clone(),
                profile: binding.profile.clone(),
            });
        }
        if !cors_bindings.iter().any(|b| b.prefix == "/") {
            return Err(ConfigError::Validation(
                "cors bindings must include a catch-all \"/\" prefix so every path \
                 resolves to exactly one profile"
                    .into(),
            ));
        }

        let mut access_rules = Vec::with_capacity(config.access.rules.len());
        for rule in &config.access.rules {
            if access_rules
                .iter()
                .any(|r: &AccessRule| r.prefix() == rule.prefix)
            {
                return Err(ConfigError::Validation(format!(
                    "ambiguous access rules: prefix {:?} is bound twice",
                    rule.prefix
                )));
            }
            access_rules.push(AccessRule::from_config(rule)?);
        }

        // Longest prefix wins; ties are impossible after the duplicate
        // checks above. The secondary sort key keeps ordering fully
        // deterministic for equal lengths.
        cors_bindings.sort_by(|a, b| {
            b.prefix
                .len()
                .cmp(&a.prefix.len())
                .then_with(|| a.prefix.cmp(&b.prefix))
        });
        access_rules.sort_by(|a, b| {
            b.prefix()
                .len()
                .cmp(&a.prefix().len())
                .then_with(|| a.prefix().cmp(b.prefix()))
        });

        tracing::debug!(
            profiles = profiles.len(),
            cors_bindings = cors_bindings.len(),
            access_rules = access_rules.len(),
            "policy store built"
        );

        Ok(Self {
            profiles,
            cors_bindings,
            access_rules,
        })
    }

    /// Resolve the CORS policy for a request path. Total: the catch-all
    /// binding enforced at load time guarantees a match for any absolute
    /// path.
    pub fn resolve_cors(&self, path: &str) -> &CorsPolicy {
        let binding = self
            .cors_bindings
            .iter()
            .find(|b| path.starts_with(&b.prefix))
            .expect("a catch-all \"/\" cors binding is enforced at load time");
        self.profiles
            .get(&binding.profile)
            .expect("binding profiles are verified at load time")
    }

    /// Resolve the access rule for a request path. `None` means the
    /// endpoint is public: only authentication, not the role check,
    /// applies.
    pub fn resolve_access_rule(&self, path: &str) -> Option<&AccessRule> {
        self.access_rules
            .iter()
            .find(|r| path.starts_with(r.prefix()))
    }

    /// Named profile lookup, mainly for startup diagnostics.
    pub fn profile(&self, name: &str) -> Option<&CorsPolicy> {
        self.profiles.get(name)
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn access_rule_count(&self) -> usize {
        self.access_rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn store() -> PolicyStore {
        PolicyStore::from_config(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_default_store_builds() {
        let store = store();
        assert!(store.profile("default").is_some());
        assert!(store.profile("strict").is_some());
    }

    #[test]
    fn test_longest_prefix_wins_for_cors() {
        let store = store();
        assert_eq!(store.resolve_cors("/api/v1/admin/users").name(), "strict");
        assert_eq!(store.resolve_cors("/api/v1/user/profile").name(), "default");
        assert_eq!(store.resolve_cors("/health").name(), "default");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let store = store();
        for _ in 0..3 {
            assert_eq!(store.resolve_cors("/api/v1/admin/users").name(), "strict");
            let rule = store.resolve_access_rule("/api/v1/admin/users").unwrap();
            assert_eq!(rule.prefix(), "/api/v1/admin");
        }
    }

    #[test]
    fn test_access_rule_lookup_is_independent_of_cors() {
        let config = AppConfig::from_str(
            r#"
            [[access.rules]]
            prefix = "/internal"
            roles = ["ADMIN"]
        "#,
        )
        .unwrap();
        let store = PolicyStore::from_config(&config).unwrap();
        // No CORS binding for /internal beyond the catch-all; the access
        // rule still matches.
        assert_eq!(store.resolve_cors("/internal/x").name(), "default");
        assert!(store.resolve_access_rule("/internal/x").is_some());
    }

    #[test]
    fn test_no_rule_means_public() {
        assert!(store().resolve_access_rule("/health").is_none());
    }

    #[test]
    fn test_duplicate_cors_binding_rejected() {
        let config = AppConfig::from_str(
            r#"
            [[cors.bindings]]
            prefix = "/"
            profile = "default"

            [[cors.bindings]]
            prefix = "/"
            profile = "strict"
        "#,
        )
        .unwrap();
        let err = PolicyStore::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("ambiguous"), "{err}");
    }

    #[test]
    fn test_duplicate_access_rule_rejected() {
        let config = AppConfig::from_str(
            r#"
            [[access.rules]]
            prefix = "/api/v1/user"
            roles = ["USER"]

            [[access.rules]]
            prefix = "/api/v1/user"
            roles = ["ADMIN"]
        "#,
        )
        .unwrap();
        assert!(PolicyStore::from_config(&config).is_err());
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let config = AppConfig::from_str(
            r#"
            [[cors.bindings]]
            prefix = "/"
            profile = "default"

            [[cors.bindings]]
            prefix = "/api"
            profile = "missing"
        "#,
        )
        .unwrap();
        let err = PolicyStore::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("unknown profile"), "{err}");
    }

    #[test]
    fn test_missing_catch_all_rejected() {
        let config = AppConfig::from_str(
            r#"
            [cors]
            bindings = [{ prefix = "/api", profile = "default" }]
        "#,
        )
        .unwrap();
        let err = PolicyStore::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("catch-all"), "{err}");
    }

    #[test]
    fn test_wildcard_with_credentials_fails_load() {
        let config = AppConfig::from_str(
            r#"
            [cors.profiles.default]
            allowed_origins = ["*"]
            allow_credentials = true
        "#,
        )
        .unwrap();
        assert!(PolicyStore::from_config(&config).is_err());
    }
}
