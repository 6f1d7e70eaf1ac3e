// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of being silently ignored.

use qadesk_core::Catalog;
use serde::{Deserialize, Serialize};

/// Top-level qadesk configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QadeskConfig {
    /// Front-end behavior and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// Remote report generator (Gemini) settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Durable draft and history storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Online/offline detection.
    #[serde(default)]
    pub connectivity: ConnectivityConfig,

    /// Browser, environment and database catalogs.
    #[serde(default)]
    pub catalog: Catalog,
}

/// Front-end configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Gemini `generateContent` settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// API key. `None` falls back to `GEMINI_API_KEY`, then `API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL, without the `/models/...` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP timeout for one generation call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    120
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database holding drafts and history.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("qadesk").join("qadesk.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "qadesk.db".to_string())
}

/// Online/offline detection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectivityConfig {
    /// Run the background reachability probe.
    #[serde(default = "default_probe_enabled")]
    pub probe_enabled: bool,

    /// Host the probe connects to.
    #[serde(default = "default_probe_host")]
    pub probe_host: String,

    /// TCP port the probe connects to.
    #[serde(default = "default_probe_port")]
    pub probe_port: u16,

    /// Seconds between probes.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,

    /// Connect timeout for one probe, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_enabled: default_probe_enabled(),
            probe_host: default_probe_host(),
            probe_port: default_probe_port(),
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

fn default_probe_enabled() -> bool {
    true
}

fn default_probe_host() -> String {
    "generativelanguage.googleapis.com".to_string()
}

fn default_probe_port() -> u16 {
    443
}

fn default_probe_interval_secs() -> u64 {
    15
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = QadeskConfig::default();
        assert_eq!(config.app.log_level, "warn");
        assert_eq!(config.generator.model, "gemini-3-flash-preview");
        assert!((config.generator.temperature - 0.2).abs() < f32::EPSILON);
        assert!(config.generator.api_key.is_none());
        assert!(config.connectivity.probe_enabled);
        assert_eq!(config.connectivity.probe_port, 443);
        assert_eq!(config.catalog, Catalog::builtin());
    }

    #[test]
    fn partial_catalog_keeps_other_builtin_tables() {
        let toml_str = r#"
[catalog]
browsers = ["Google Chrome"]
"#;
        let config: QadeskConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.catalog.browsers, vec!["Google Chrome"]);
        assert_eq!(config.catalog.databases, Catalog::builtin().databases);
    }

    #[test]
    fn unknown_generator_key_is_rejected() {
        let toml_str = r#"
[generator]
modle = "gemini-pro"
"#;
        assert!(toml::from_str::<QadeskConfig>(toml_str).is_err());
    }
}
