// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so typos are rejected at
//! startup instead of silently falling back to defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Every section is optional and defaults to values suitable for the
/// docker-compose deployment next to a WAHA container.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BolsoConfig {
    /// HTTP listener and logging.
    #[serde(default)]
    pub server: ServerConfig,

    /// WAHA (WhatsApp HTTP API) transport.
    #[serde(default)]
    pub waha: WahaConfig,

    /// Gemini extraction model.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// SQLite storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Monthly message quota.
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Reference timezone and phone numbering.
    #[serde(default)]
    pub locale: LocaleConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Expose Prometheus metrics on `/metrics`.
    #[serde(default = "default_true")]
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            metrics: true,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// WAHA transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WahaConfig {
    /// Base URL of the WAHA API. Relative media references resolve against it.
    #[serde(default = "default_waha_url")]
    pub api_url: String,

    /// WAHA session name.
    #[serde(default = "default_waha_session")]
    pub session: String,

    /// Optional API key sent as `X-Api-Key`.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for WahaConfig {
    fn default() -> Self {
        Self {
            api_url: default_waha_url(),
            session: default_waha_session(),
            api_key: None,
        }
    }
}

fn default_waha_url() -> String {
    "http://waha:3000".to_string()
}

fn default_waha_session() -> String {
    "default".to_string()
}

/// Gemini provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Google AI API key. Required by `serve`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Ask the model for an `application/json` response body.
    #[serde(default = "default_true")]
    pub json_mode: bool,

    /// Retries on transient HTTP errors. Zero keeps one call per message.
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            json_mode: true,
            max_retries: 0,
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Base64-encoded 32-byte key. When set, transaction amount, description
    /// and notes are stored AES-256-GCM encrypted.
    #[serde(default)]
    pub encryption_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
            encryption_key: None,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("bolso").join("bolso.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("bolso.db"))
        .to_string_lossy()
        .into_owned()
}

/// Monthly quota configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Limit assigned to counters created on first use, and reported when
    /// the counter store is unreachable.
    #[serde(default = "default_monthly_limit")]
    pub default_monthly_limit: u32,

    /// Limits at or above this value count as unlimited (no warnings).
    #[serde(default = "default_unlimited_threshold")]
    pub unlimited_threshold: u32,

    /// Usage ratio from which the remaining-count warning is appended.
    #[serde(default = "default_warning_ratio")]
    pub warning_ratio: f64,

    /// Remaining count at or below which the upgrade link is appended.
    #[serde(default = "default_upgrade_remaining")]
    pub upgrade_remaining: u32,

    /// Where users upgrade their plan.
    #[serde(default = "default_upgrade_url")]
    pub upgrade_url: String,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_monthly_limit: default_monthly_limit(),
            unlimited_threshold: default_unlimited_threshold(),
            warning_ratio: default_warning_ratio(),
            upgrade_remaining: default_upgrade_remaining(),
            upgrade_url: default_upgrade_url(),
        }
    }
}

fn default_monthly_limit() -> u32 {
    30
}

fn default_unlimited_threshold() -> u32 {
    100_000
}

fn default_warning_ratio() -> f64 {
    0.8
}

fn default_upgrade_remaining() -> u32 {
    5
}

fn default_upgrade_url() -> String {
    "https://meubolso.app/planos".to_string()
}

/// Locale configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocaleConfig {
    /// Fixed UTC offset of the reference timezone, in minutes.
    /// Default is -180 (America/Sao_Paulo, which has no DST since 2019).
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    /// Country calling code tried as a prefix on legacy phone lookups.
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            country_code: default_country_code(),
        }
    }
}

fn default_utc_offset_minutes() -> i32 {
    -180
}

fn default_country_code() -> String {
    "55".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = BolsoConfig::default();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.waha.api_url, "http://waha:3000");
        assert_eq!(config.waha.session, "default");
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.gemini.max_retries, 0);
        assert!(config.gemini.json_mode);
        assert_eq!(config.quota.default_monthly_limit, 30);
        assert_eq!(config.locale.utc_offset_minutes, -180);
        assert_eq!(config.locale.country_code, "55");
        assert!(config.storage.encryption_key.is_none());
    }

    #[test]
    fn default_database_path_ends_with_bolso_db() {
        let config = StorageConfig::default();
        assert!(config.database_path.ends_with("bolso.db"));
    }
}
