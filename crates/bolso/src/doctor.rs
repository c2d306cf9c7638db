// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bolso doctor` command implementation.
//!
//! Runs diagnostic checks against the deployment: storage, the WAHA session
//! and the Gemini credentials.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use bolso_config::BolsoConfig;
use bolso_config::model::{GeminiConfig, StorageConfig, WahaConfig};
use bolso_core::{BolsoError, HealthStatus, PluginAdapter, StorageAdapter};
use bolso_storage::SqliteStorage;
use bolso_waha::WahaChannel;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `bolso doctor` command. With `plain`, disables colored output.
pub async fn run_doctor(config: &BolsoConfig, plain: bool) -> Result<(), BolsoError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_storage(&config.storage).await,
        check_waha(&config.waha).await,
        check_gemini_key(&config.gemini),
    ];

    println!();
    println!("  bolso doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", render_line(result, use_color));
    }

    println!();
    match issues {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
    println!();

    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    use colored::Colorize;

    let duration_ms = result.duration.as_millis();
    if !use_color {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        return format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    let (symbol, message) = match result.status {
        CheckStatus::Pass => ("✓".green(), result.message.normal()),
        CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
        CheckStatus::Fail => ("✗".red(), result.message.red()),
    };
    format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
}

/// Open the database, run migrations and check it answers.
async fn check_storage(config: &StorageConfig) -> CheckResult {
    let start = Instant::now();
    let storage = match SqliteStorage::new(config.clone()) {
        Ok(storage) => storage,
        Err(e) => return CheckResult::new("Storage", CheckStatus::Fail, e.to_string(), start),
    };
    if let Err(e) = storage.initialize().await {
        return CheckResult::new("Storage", CheckStatus::Fail, e.to_string(), start);
    }

    let result = match storage.health_check().await {
        Ok(HealthStatus::Healthy) => {
            let encryption = if storage.encrypts_fields() {
                "encrypted"
            } else {
                "unencrypted"
            };
            CheckResult::new(
                "Storage",
                CheckStatus::Pass,
                format!("{} ({encryption})", config.database_path),
                start,
            )
        }
        Ok(status) => CheckResult::new("Storage", CheckStatus::Warn, format!("{status:?}"), start),
        Err(e) => CheckResult::new("Storage", CheckStatus::Fail, e.to_string(), start),
    };
    let _ = storage.close().await;
    result
}

/// Ask WAHA for the session status.
async fn check_waha(config: &WahaConfig) -> CheckResult {
    let start = Instant::now();
    let channel = match WahaChannel::new(config) {
        Ok(channel) => channel,
        Err(e) => return CheckResult::new("WAHA session", CheckStatus::Fail, e.to_string(), start),
    };
    match channel.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "WAHA session",
            CheckStatus::Pass,
            format!("{} is WORKING", config.session),
            start,
        ),
        Ok(HealthStatus::Degraded(detail)) => {
            CheckResult::new("WAHA session", CheckStatus::Warn, detail, start)
        }
        Ok(HealthStatus::Unhealthy(detail)) => {
            CheckResult::new("WAHA session", CheckStatus::Fail, detail, start)
        }
        Err(e) => CheckResult::new("WAHA session", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Key presence only; no request is made.
fn check_gemini_key(config: &GeminiConfig) -> CheckResult {
    let start = Instant::now();
    let from_config = config.api_key.as_deref().is_some_and(|k| !k.is_empty());
    let from_env = std::env::var("GEMINI_API_KEY").is_ok_and(|k| !k.is_empty());

    match (from_config, from_env) {
        (true, _) => CheckResult::new("Gemini key", CheckStatus::Pass, "set in config", start),
        (false, true) => {
            CheckResult::new("Gemini key", CheckStatus::Pass, "set via GEMINI_API_KEY", start)
        }
        (false, false) => CheckResult::new(
            "Gemini key",
            CheckStatus::Fail,
            "missing: set gemini.api_key or GEMINI_API_KEY",
            start,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn plain_line_has_tag() {
        let result = CheckResult {
            name: "Storage".into(),
            status: CheckStatus::Warn,
            message: "slow".into(),
            duration: Duration::from_millis(3),
        };
        let line = render_line(&result, false);
        assert!(line.contains("[WARN]"));
        assert!(line.contains("slow (3ms)"));
    }

    #[tokio::test]
    async fn storage_check_passes_on_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("doctor.db").to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };
        let result = check_storage(&config).await;
        assert_eq!(result.status, CheckStatus::Pass, "{}", result.message);
        assert!(result.message.contains("unencrypted"));
    }

    #[tokio::test]
    async fn storage_check_fails_on_bad_key() {
        let config = StorageConfig {
            encryption_key: Some("c2hvcnQ=".into()),
            ..StorageConfig::default()
        };
        assert_eq!(check_storage(&config).await.status, CheckStatus::Fail);
    }

    #[tokio::test]
    async fn unreachable_waha_fails() {
        let config = WahaConfig {
            api_url: "http://127.0.0.1:1".into(),
            ..WahaConfig::default()
        };
        assert_eq!(check_waha(&config).await.status, CheckStatus::Fail);
    }

    #[test]
    #[serial]
    fn gemini_key_from_config() {
        let config = GeminiConfig {
            api_key: Some("g-123".into()),
            ..GeminiConfig::default()
        };
        assert_eq!(check_gemini_key(&config).status, CheckStatus::Pass);
    }

    #[test]
    #[serial]
    fn gemini_key_missing_fails() {
        // SAFETY: serialized with the other env-reading tests.
        unsafe { std::env::remove_var("GEMINI_API_KEY") };
        assert_eq!(
            check_gemini_key(&GeminiConfig::default()).status,
            CheckStatus::Fail
        );
    }
}
