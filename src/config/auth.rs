use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Authentication configuration.
///
/// The token table feeds the built-in static authenticator. An empty table
/// is valid configuration (every request is rejected with 401) but draws a
/// startup warning, since the service is then unusable for API clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Bearer token table: token string to the identity it authenticates.
    ///
    /// ```toml
    /// [auth.tokens.dev-alice-token]
    /// username = "alice"
    /// roles = ["USER"]
    /// ```
    #[serde(default)]
    pub tokens: BTreeMap<String, TokenEntry>,
}

/// Identity bound to one bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenEntry {
    /// Username reported by the profile endpoints.
    pub username: String,

    /// Roles granted to the principal. Must be non-empty.
    pub roles: Vec<String>,
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (token, entry) in &self.tokens {
            if token.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "auth.tokens contains an empty token string".into(),
                ));
            }
            if entry.username.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "auth.tokens entry has an empty username".into(),
                ));
            }
            if entry.roles.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "auth.tokens entry for user {:?} has an empty role set",
                    entry.username
                )));
            }
            if entry.roles.iter().any(|r| r.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "auth.tokens entry for user {:?} contains a blank role token",
                    entry.username
                )));
            }
        }
        Ok(())
    }
}
