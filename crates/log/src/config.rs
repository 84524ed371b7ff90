//! Logger configuration and presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Filter variable, takes precedence over `RUST_LOG`.
pub const LOG_ENV: &str = "KEYSTONE_LOG";
/// Format variable: `pretty`, `compact` or `json`.
pub const FORMAT_ENV: &str = "KEYSTONE_LOG_FORMAT";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Log level filter (e.g., "info", "debug,keystone_backend=trace")
    pub level: String,

    /// Output format
    pub format: Format,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable, multi-line
    Pretty,
    /// Compact single-line output
    #[default]
    Compact,
    /// Structured JSON output
    Json,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Pretty => write!(f, "pretty"),
            Format::Compact => write!(f, "compact"),
            Format::Json => write!(f, "json"),
        }
    }
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            other => Err(LogError::Config(format!(
                "unknown format '{other}', expected pretty, compact or json"
            ))),
        }
    }
}

/// What each event line shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Show timestamps
    pub time: bool,
    /// Show source location (`file:line`)
    pub source: bool,
    /// Show target module
    pub target: bool,
    /// Show thread IDs
    pub thread_ids: bool,
    /// Use ANSI colors
    pub colors: bool,
    /// Show span list in JSON
    pub span_list: bool,
    /// Flatten JSON events
    pub flatten: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time: true,
            source: cfg!(debug_assertions),
            target: true,
            thread_ids: false,
            colors: cfg!(feature = "ansi") && std::io::IsTerminal::is_terminal(&std::io::stderr()),
            span_list: true,
            flatten: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Default configuration with environment overrides applied
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `KEYSTONE_LOG` (or `RUST_LOG`) and `KEYSTONE_LOG_FORMAT` on top
    /// of this configuration. An unknown format falls back to compact.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides), reading
    /// variables through `var`.
    #[must_use]
    pub fn apply_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = var(LOG_ENV).or_else(|| var("RUST_LOG")) {
            self.level = level;
        }
        if let Some(format) = var(FORMAT_ENV) {
            self.format = format.parse().unwrap_or(Format::Compact);
        }
        self
    }

    /// Development configuration (pretty, debug level)
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
            display: DisplayConfig {
                colors: true,
                source: true,
                ..DisplayConfig::default()
            },
        }
    }

    /// Production configuration (JSON, info level)
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
            display: DisplayConfig {
                colors: false,
                source: false,
                flatten: true,
                ..DisplayConfig::default()
            },
        }
    }

    /// Test configuration (no colors, no timestamps)
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "trace".to_string(),
            format: Format::Compact,
            display: DisplayConfig {
                colors: false,
                time: false,
                ..DisplayConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn keystone_log_wins_over_rust_log() {
        let config =
            Config::default().apply_env(env(&[(LOG_ENV, "debug"), ("RUST_LOG", "warn")]));
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn rust_log_is_the_fallback() {
        let config = Config::default().apply_env(env(&[("RUST_LOG", "warn")]));
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn no_variables_keep_the_config() {
        let config = Config::production().apply_env(env(&[]));
        assert_eq!(config, Config::production());
    }

    #[rstest]
    #[case("json", Format::Json)]
    #[case("PRETTY", Format::Pretty)]
    #[case("compact", Format::Compact)]
    #[case("logfmt", Format::Compact)]
    fn format_from_env(#[case] value: &str, #[case] expected: Format) {
        let config = Config::production().apply_env(env(&[(FORMAT_ENV, value)]));
        assert_eq!(config.format, expected);
    }

    #[test]
    fn unknown_format_is_an_error_when_parsed() {
        assert!(matches!("xml".parse::<Format>(), Err(LogError::Config(_))));
    }

    #[test]
    fn presets() {
        assert_eq!(Config::development().format, Format::Pretty);
        assert_eq!(Config::development().level, "debug");
        assert_eq!(Config::production().format, Format::Json);
        assert!(!Config::production().display.colors);
        assert!(!Config::test().display.time);
    }

    #[test]
    fn deserializes_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{ "level": "warn", "display": { "time": false } }"#).unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, Format::Compact);
        assert!(!config.display.time);
        assert!(config.display.target);
    }
}
