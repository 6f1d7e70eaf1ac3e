// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::QadeskConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Checks semantic constraints serde cannot express.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &QadeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        fail(format!(
            "app.log_level `{}` must be one of {}",
            config.app.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.generator.model.trim().is_empty() {
        fail("generator.model must not be empty".to_string());
    }

    let base_url = config.generator.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "generator.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if !(0.0..=2.0).contains(&config.generator.temperature) {
        fail(format!(
            "generator.temperature must be between 0.0 and 2.0, got {}",
            config.generator.temperature
        ));
    }

    if config.generator.timeout_secs == 0 {
        fail("generator.timeout_secs must be at least 1".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.connectivity.probe_enabled {
        if config.connectivity.probe_host.trim().is_empty() {
            fail("connectivity.probe_host must not be empty when the probe is enabled".to_string());
        }
        if config.connectivity.probe_interval_secs == 0 {
            fail("connectivity.probe_interval_secs must be at least 1".to_string());
        }
        if config.connectivity.probe_timeout_ms == 0 {
            fail("connectivity.probe_timeout_ms must be at least 1".to_string());
        }
    }

    let catalog = &config.catalog;
    if catalog.browsers.is_empty() {
        fail("catalog.browsers must list at least one browser".to_string());
    }

    let mut seen = HashSet::new();
    for browser in &catalog.browsers {
        if !seen.insert(browser) {
            fail(format!("duplicate browser `{browser}` in catalog.browsers"));
        }
    }

    for project in catalog.environments.keys() {
        match project.parse::<qadesk_core::Project>() {
            Ok(known) if known.to_string() != *project => fail(format!(
                "catalog.environments key `{project}` must be written `{known}`"
            )),
            Ok(_) => {}
            Err(_) => fail(format!(
                "catalog.environments has unknown project `{project}`"
            )),
        }
    }

    for (project, environment) in catalog.unmapped_environments() {
        fail(format!(
            "environment `{environment}` of project {project} has no entry in catalog.databases"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
