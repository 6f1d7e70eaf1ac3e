// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for qadesk.
//!
//! TOML configuration with strict key checking, XDG file lookup,
//! `QADESK_*` environment overrides, and miette diagnostics with typo
//! suggestions.
//!
//! ```no_run
//! use qadesk_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("model: {}", config.generator.model);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::QadeskConfig;

/// Loads configuration from the XDG hierarchy and validates it.
pub fn load_and_validate() -> Result<QadeskConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Loads configuration from an explicit file (plus env overrides) and validates it.
pub fn load_and_validate_path(path: &Path) -> Result<QadeskConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Loads configuration from a TOML string and validates it.
pub fn load_and_validate_str(toml_content: &str) -> Result<QadeskConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<QadeskConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<QadeskConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(model = %config.generator.model, "configuration loaded");
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Reads the TOML files of the hierarchy so diagnostics can point into them.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from(loader::SYSTEM_CONFIG_PATH)];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("qadesk").join(loader::LOCAL_CONFIG_FILE));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(loader::LOCAL_CONFIG_FILE));
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
