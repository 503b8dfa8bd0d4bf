use serde::{Deserialize, Serialize};

use crate::{
    auth::{ROLE_ADMIN, ROLE_USER},
    policy::MatchMode,
};

/// Role-based access rules: path prefixes mapped to required role sets.
///
/// Rules are matched by longest prefix, independently of the CORS bindings.
/// Paths with no matching rule are public to any authenticated principal.
/// The defaults mirror the shipped endpoints: user endpoints open to `USER`
/// or `ADMIN`, admin endpoints restricted to `ADMIN`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<AccessRuleConfig>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

/// One path-prefix access rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessRuleConfig {
    pub prefix: String,

    /// Required roles. Must be non-empty.
    pub roles: Vec<String>,

    /// How the role set is evaluated against the principal.
    #[serde(default)]
    pub mode: MatchMode,
}

fn default_rules() -> Vec<AccessRuleConfig> {
    vec![
        AccessRuleConfig {
            prefix: "/api/v1/user".to_string(),
            roles: vec![ROLE_USER.to_string(), ROLE_ADMIN.to_string()],
            mode: MatchMode::Any,
        },
        AccessRuleConfig {
            prefix: "/api/v1/admin".to_string(),
            roles: vec![ROLE_ADMIN.to_string()],
            mode: MatchMode::All,
        },
    ]
}
