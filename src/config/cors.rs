use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Wildcard sentinel accepted in `allowed_origins` and `allowed_headers`.
pub const CORS_WILDCARD: &str = "*";

/// CORS configuration: named policy profiles plus path-prefix bindings that
/// select which profile applies to a request.
///
/// Exactly one profile applies per path, chosen by longest-prefix match over
/// the bindings; profiles are never merged. The defaults ship a permissive
/// `default` profile for general API traffic bound to `/` and a stricter
/// `strict` profile bound to the admin prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Named CORS policy profiles.
    #[serde(default = "default_profiles")]
    pub profiles: BTreeMap<String, CorsProfileConfig>,

    /// Path-prefix to profile bindings. A catch-all `/` binding is required
    /// so every path resolves to exactly one profile.
    #[serde(default = "default_bindings")]
    pub bindings: Vec<CorsBindingConfig>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            profiles: default_profiles(),
            bindings: default_bindings(),
        }
    }
}

/// One named CORS policy profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsProfileConfig {
    /// Exact origin strings (no pattern syntax). `"*"` allows any origin and
    /// is rejected when `allow_credentials` is true.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allowed HTTP methods.
    #[serde(default = "default_methods")]
    pub allowed_methods: Vec<String>,

    /// Allowed request headers, or `["*"]` to echo whatever the preflight
    /// asks for.
    #[serde(default = "default_headers")]
    pub allowed_headers: Vec<String>,

    /// Response headers exposed to the calling script.
    #[serde(default)]
    pub exposed_headers: Vec<String>,

    /// Whether to allow credentials (cookies, authorization headers).
    #[serde(default)]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

/// Binds a path prefix to a named profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsBindingConfig {
    pub prefix: String,
    pub profile: String,
}

fn default_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "OPTIONS", "PATCH"]
        .map(String::from)
        .to_vec()
}

fn default_headers() -> Vec<String> {
    vec![CORS_WILDCARD.to_string()]
}

fn default_max_age() -> u64 {
    3600
}

fn default_profiles() -> BTreeMap<String, CorsProfileConfig> {
    let mut profiles = BTreeMap::new();
    profiles.insert(
        "default".to_string(),
        CorsProfileConfig {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:4200".to_string(),
            ],
            allowed_methods: default_methods(),
            allowed_headers: default_headers(),
            exposed_headers: ["Authorization", "Content-Type", "X-Total-Count"]
                .map(String::from)
                .to_vec(),
            allow_credentials: true,
            max_age_secs: default_max_age(),
        },
    );
    profiles.insert(
        "strict".to_string(),
        CorsProfileConfig {
            allowed_origins: vec![
                "https://app.example.com".to_string(),
                "https://admin.example.com".to_string(),
            ],
            allowed_methods: ["GET", "POST", "PUT", "DELETE"].map(String::from).to_vec(),
            allowed_headers: [
                "Authorization",
                "Content-Type",
                "X-Requested-With",
                "Accept",
                "Origin",
            ]
            .map(String::from)
            .to_vec(),
            exposed_headers: ["Authorization", "Content-Type"].map(String::from).to_vec(),
            allow_credentials: true,
            max_age_secs: 1800,
        },
    );
    profiles
}

fn default_bindings() -> Vec<CorsBindingConfig> {
    vec![
        CorsBindingConfig {
            prefix: "/".to_string(),
            profile: "default".to_string(),
        },
        CorsBindingConfig {
            prefix: "/api/v1/admin".to_string(),
            profile: "strict".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_ship_two_profiles() {
        let config = CorsConfig::default();
        assert!(config.profiles.contains_key("default"));
        assert!(config.profiles.contains_key("strict"));
        assert_eq!(config.bindings.len(), 2);
        assert!(config.bindings.iter().any(|b| b.prefix == "/"));
    }

    #[test]
    fn test_default_profile_allows_local_dev_origins() {
        let config = CorsConfig::default();
        let profile = &config.profiles["default"];
        assert!(
            profile
                .allowed_origins
                .contains(&"http://localhost:3000".to_string())
        );
        assert_eq!(profile.allowed_headers, vec![CORS_WILDCARD]);
        assert!(profile.allow_credentials);
    }

    #[test]
    fn test_strict_profile_has_fixed_headers() {
        let config = CorsConfig::default();
        let profile = &config.profiles["strict"];
        assert!(!profile.allowed_headers.contains(&CORS_WILDCARD.to_string()));
        assert_eq!(profile.max_age_secs, 1800);
    }

    #[test]
    fn test_parse_custom_profile() {
        let config: CorsConfig = toml::from_str(
            r#"
            [profiles.api]
            allowed_origins = ["https://example.com"]
            allow_credentials = false

            [[bindings]]
            prefix = "/"
            profile = "api"
        "#,
        )
        .unwrap();
        assert_eq!(config.profiles.len(), 1);
        assert_eq!(config.profiles["api"].max_age_secs, 3600);
        assert_eq!(config.bindings.len(), 1);
    }
}
