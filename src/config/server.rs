use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base path for all versioned API routes (e.g., "/api/v1").
    /// The health endpoint is always served from "/health".
    #[serde(default = "default_api_base_path")]
    pub api_base_path: String,

    /// Request body size limit in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_base_path: default_api_base_path(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_base_path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "server.api_base_path must start with '/': {:?}",
                self.api_base_path
            )));
        }
        if self.api_base_path.len() > 1 && self.api_base_path.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "server.api_base_path must not end with '/': {:?}",
                self.api_base_path
            )));
        }
        Ok(())
    }
}

fn default_host() -> IpAddr {
    "127.0.0.1".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

fn default_api_base_path() -> String {
    "/api/v1".to_string()
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MB; the service only carries small JSON payloads
}
