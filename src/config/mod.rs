//! Configuration module for the role-gated API service.
//!
//! The service is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [auth.tokens.${DEV_TOKEN}]
//! username = "alice"
//! roles = ["USER"]
//! ```
//!
//! Validation runs once, deterministically, before the server begins
//! accepting connections. Shallow per-section checks live here; the policy
//! invariants (wildcard origins with credentials, ambiguous prefixes, empty
//! role sets) are enforced when [`crate::policy::PolicyStore`] is built from
//! the validated config. Either failure aborts startup.

mod access;
mod auth;
mod cors;
mod logging;
mod server;

use std::path::Path;

pub use access::{AccessConfig, AccessRuleConfig};
pub use auth::{AuthConfig, TokenEntry};
pub use cors::{CORS_WILDCARD, CorsBindingConfig, CorsConfig, CorsProfileConfig};
pub use logging::{LogFormat, LoggingConfig};
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;

/// Root configuration for the service.
///
/// All sections are optional with defaults that reproduce the stock
/// deployment: local-dev CORS on `/`, strict CORS on the admin prefix, and
/// the user/admin role rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Bearer-token authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// CORS policy profiles and path bindings.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Role-based access rules.
    #[serde(default)]
    pub access: AccessConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables will cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: AppConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the per-section invariants.
    fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

/// Configuration errors. Fatal at startup: the process refuses to start
/// rather than run with ambiguous policy.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand environment variables in the format `${VAR_NAME}`.
/// Variables appearing after a `#` comment on a line are left alone.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut line_result = String::with_capacity(line.len());
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let match_start = cap.get(0).unwrap().start();
            if let Some(pos) = comment_pos
                && match_start >= pos
            {
                continue;
            }

            line_result.push_str(&line[last_end..match_start]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            line_result.push_str(&value);

            last_end = cap.get(0).unwrap().end();
        }

        line_result.push_str(&line[last_end..]);
        result.push_str(&line_result);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}
