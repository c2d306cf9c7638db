// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: non-empty addresses,
//! sane quota thresholds, a decodable encryption key.

use base64::Engine;

use crate::diagnostic::ConfigError;
use crate::model::BolsoConfig;

/// Largest UTC offset in use anywhere, in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &BolsoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        )));
    }

    let waha_url = config.waha.api_url.trim();
    if !(waha_url.starts_with("http://") || waha_url.starts_with("https://")) {
        errors.push(ConfigError::validation(format!(
            "waha.api_url must be an http(s) URL, got `{waha_url}`"
        )));
    }

    if config.waha.session.trim().is_empty() {
        errors.push(ConfigError::validation("waha.session must not be empty"));
    }

    if config.gemini.model.trim().is_empty() {
        errors.push(ConfigError::validation("gemini.model must not be empty"));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if let Some(key) = &config.storage.encryption_key {
        match base64::engine::general_purpose::STANDARD.decode(key.trim()) {
            Ok(bytes) if bytes.len() == 32 => {}
            Ok(bytes) => errors.push(ConfigError::validation(format!(
                "storage.encryption_key must decode to 32 bytes, got {}",
                bytes.len()
            ))),
            Err(_) => errors.push(ConfigError::validation(
                "storage.encryption_key is not valid base64",
            )),
        }
    }

    let quota = &config.quota;
    if quota.default_monthly_limit == 0 {
        errors.push(ConfigError::validation(
            "quota.default_monthly_limit must be at least 1",
        ));
    }

    if !(quota.warning_ratio > 0.0 && quota.warning_ratio <= 1.0) {
        errors.push(ConfigError::validation(format!(
            "quota.warning_ratio must be in (0, 1], got {}",
            quota.warning_ratio
        )));
    }

    if quota.unlimited_threshold <= quota.default_monthly_limit {
        errors.push(ConfigError::validation(format!(
            "quota.unlimited_threshold ({}) must be greater than quota.default_monthly_limit ({})",
            quota.unlimited_threshold, quota.default_monthly_limit
        )));
    }

    if config.locale.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        errors.push(ConfigError::validation(format!(
            "locale.utc_offset_minutes must be within ±{MAX_UTC_OFFSET_MINUTES}, got {}",
            config.locale.utc_offset_minutes
        )));
    }

    let cc = &config.locale.country_code;
    if cc.is_empty() || !cc.chars().all(|c| c.is_ascii_digit()) {
        errors.push(ConfigError::validation(format!(
            "locale.country_code must be digits only, got `{cc}`"
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
