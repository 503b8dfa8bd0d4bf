//! Authentication collaborator contract.
//!
//! Token issuance and signature verification live outside this service. The
//! pipeline only needs something that turns a bearer token into a
//! [`Principal`] or reports the request as unauthenticated, so that contract
//! is a trait. The shipped implementation is a static token table from
//! `[auth.tokens]` configuration, intended for development and tests;
//! production deployments plug a real verifier in behind the same trait.

use subtle::ConstantTimeEq;

use super::Principal;
use crate::{config::AuthConfig, error::ApiError};

/// Verifies a bearer token and produces the principal it identifies.
///
/// Implementations must not leak whether a token was close to valid; the
/// error for any failed verification is a generic 401.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<Principal, ApiError>;
}

/// Token-table authenticator backed by `[auth.tokens]` configuration.
pub struct StaticTokenAuthenticator {
    tokens: Vec<(String, Principal)>,
}

impl StaticTokenAuthenticator {
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|(token, entry)| {
                (
                    token.clone(),
                    Principal::new(entry.username.clone(), entry.roles.iter().cloned()),
                )
            })
            .collect();
        Self { tokens }
    }

    /// Number of configured tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> Result<Principal, ApiError> {
        // Scan the whole table without early exit so lookup time does not
        // depend on which entry (if any) matched.
        let mut found: Option<&Principal> = None;
        for (candidate, principal) in &self.tokens {
            if candidate.as_bytes().ct_eq(token.as_bytes()).into() {
                found = Some(principal);
            }
        }

        found
            .cloned()
            .ok_or_else(|| ApiError::unauthenticated("Invalid or expired token"))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::config::TokenEntry;

    fn authenticator() -> StaticTokenAuthenticator {
        let mut config = AuthConfig::default();
        config.tokens.insert(
            "user-token".to_string(),
            TokenEntry {
                username: "alice".to_string(),
                roles: vec!["USER".to_string()],
            },
        );
        config.tokens.insert(
            "admin-token".to_string(),
            TokenEntry {
                username: "bob".to_string(),
                roles: vec!["ADMIN".to_string()],
            },
        );
        StaticTokenAuthenticator::from_config(&config)
    }

    #[test]
    fn test_known_token_yields_principal() {
        let auth = authenticator();
        assert_eq!(auth.len(), 2);
        let principal = auth.authenticate("user-token").unwrap();
        assert_eq!(principal.username(), "alice");
        assert!(principal.has_role("USER"));
    }

    #[test]
    fn test_unknown_token_is_generic_401() {
        let err = authenticator().authenticate("nope").unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        // Generic message: must not hint at valid tokens or usernames.
        assert!(!err.message().contains("alice"));
    }

    #[test]
    fn test_token_prefix_does_not_match() {
        let err = authenticator().authenticate("user-toke").unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_empty_table_rejects_everything() {
        let empty = StaticTokenAuthenticator::from_config(&AuthConfig::default());
        assert!(empty.is_empty());
        assert!(empty.authenticate("anything").is_err());
    }
}
