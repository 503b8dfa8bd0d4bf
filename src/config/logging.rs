use serde::{Deserialize, Serialize};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "rolegate=debug,info").
    /// Overridden by the RUST_LOG environment variable when set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Console log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include timestamps in console output. Disable when an external log
    /// collector already stamps lines.
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            timestamps: default_timestamps(),
        }
    }
}

/// Console log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output for development.
    #[default]
    Pretty,
    /// Single-line output for terminals and service logs.
    Compact,
    /// Structured JSON for log aggregation pipelines.
    Json,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_timestamps() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.timestamps);
    }

    #[test]
    fn test_parse_json_format() {
        let config: LoggingConfig = toml::from_str(
            r#"
            level = "debug"
            format = "json"
            timestamps = false
        "#,
        )
        .unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.timestamps);
    }
}
