// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the bolso intake relay.
//!
//! TOML files plus `BOLSO_*` environment overrides, strict key checking,
//! semantic validation, and miette-rendered diagnostics.
//!
//! ```no_run
//! use bolso_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on port {}", config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::BolsoConfig;

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<BolsoConfig, Vec<ConfigError>> {
    finish(loader::load_config())
}

/// Load configuration from an explicit file and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<BolsoConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path))
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<BolsoConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content))
}

#[allow(clippy::result_large_err)]
fn finish(loaded: Result<BolsoConfig, figment::Error>) -> Result<BolsoConfig, Vec<ConfigError>> {
    let config = loaded.map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}
