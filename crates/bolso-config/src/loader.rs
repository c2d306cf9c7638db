// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./bolso.toml` > `~/.config/bolso/bolso.toml` > `/etc/bolso/bolso.toml`,
//! with `BOLSO_*` environment variables overriding all files.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BolsoConfig;

/// Config sections, in the form they appear as env var prefixes.
const SECTIONS: &[&str] = &["server", "waha", "gemini", "storage", "quota", "locale"];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/bolso/bolso.toml`
/// 3. `~/.config/bolso/bolso.toml`
/// 4. `./bolso.toml`
/// 5. `BOLSO_*` environment variables
pub fn load_config() -> Result<BolsoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<BolsoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BolsoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BolsoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BolsoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BolsoConfig::default()))
        .merge(Toml::file("/etc/bolso/bolso.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("bolso/bolso.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("bolso.toml"))
        .merge(env_provider())
}

/// Env provider mapping `BOLSO_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after the section name becomes a dot, so
/// `BOLSO_GEMINI_API_KEY` lands on `gemini.api_key` and
/// `BOLSO_QUOTA_DEFAULT_MONTHLY_LIMIT` on `quota.default_monthly_limit`.
fn env_provider() -> Env {
    Env::prefixed("BOLSO_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
