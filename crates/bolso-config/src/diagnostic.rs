// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config error diagnostics rendered with miette.
//!
//! Figment errors are converted into [`ConfigError`] values; unknown keys get
//! a "did you mean" hint computed with Jaro-Winkler similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::Diagnostic;
use thiserror::Error;

/// Similarity above which an unknown key gets a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem found while loading or validating.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no section declares.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(bolso::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// Dotted path of the offending key.
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted in that section.
        valid_keys: String,
    },

    /// A value of the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(bolso::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A required key without a default.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(bolso::config::missing_key),
        help("add `{key} = <value>` to bolso.toml or set the matching BOLSO_ variable")
    )]
    MissingKey { key: String },

    /// A semantic check that failed after deserialization.
    #[error("validation error: {message}")]
    #[diagnostic(code(bolso::config::validation))]
    Validation { message: String },

    /// Anything figment reports that has no dedicated variant.
    #[error("configuration error: {0}")]
    #[diagnostic(code(bolso::config::other))]
    Other(String),
}

impl ConfigError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        ConfigError::Validation {
            message: message.into(),
        }
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert every error inside a `figment::Error` into a [`ConfigError`].
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path = error.path.join(".");
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let valid: Vec<&str> = expected.to_vec();
                    ConfigError::UnknownKey {
                        key: dotted(&path, field),
                        suggestion: suggest_key(field, &valid),
                        valid_keys: valid.join(", "),
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: dotted(&path, field),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: path,
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn dotted(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else if path.ends_with(field) {
        path.to_string()
    } else {
        format!("{path}.{field}")
    }
}

/// Best valid key for a misspelled one, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render errors to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        if handler.render_report(&mut buf, error as &dyn Diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_key() {
        let valid = &["api_url", "session", "api_key"];
        assert_eq!(suggest_key("sesion", valid), Some("session".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["host", "port", "log_level"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn help_mentions_suggestion() {
        let help = unknown_key_help(Some("session"), "api_url, session");
        assert!(help.contains("did you mean `session`"));
    }

    #[test]
    fn dotted_joins_path_and_field() {
        assert_eq!(dotted("waha", "sesion"), "waha.sesion");
        assert_eq!(dotted("", "server"), "server");
    }
}
