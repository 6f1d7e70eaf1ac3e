// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./qadesk.toml` > `~/.config/qadesk/qadesk.toml` > `/etc/qadesk/qadesk.toml`
//! with environment variable overrides via the `QADESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::QadeskConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/qadesk/qadesk.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "qadesk.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/qadesk/qadesk.toml`
/// 3. `~/.config/qadesk/qadesk.toml`
/// 4. `./qadesk.toml`
/// 5. `QADESK_*` environment variables
pub fn load_config() -> Result<QadeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<QadeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QadeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QadeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QadeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(QadeskConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("qadesk").join(LOCAL_CONFIG_FILE))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `QADESK_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys themselves
/// contain underscores: `QADESK_GENERATOR_API_KEY` must become
/// `generator.api_key`, not `generator.api.key`.
fn env_provider() -> Env {
    Env::prefixed("QADESK_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("app_", "app.", 1)
            .replacen("generator_", "generator.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("connectivity_", "connectivity.", 1);
        mapped.into()
    })
}
