// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sender identity resolution and verification-code linking.

use std::sync::Arc;

use bolso_core::BolsoError;
use bolso_core::StorageAdapter;
use bolso_core::types::AccountLink;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Length of a verification code.
pub const CODE_LEN: usize = 6;

/// Addressing scheme encoded in the sender suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// `<id>@lid`: stable platform-linked identifier.
    Linked,
    /// `<digits>@c.us`: legacy phone-number form.
    Phone,
}

/// A parsed sender identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderId {
    raw: String,
    scheme: Scheme,
}

impl SenderId {
    /// Parse a transport sender id. Returns `None` for unknown schemes or an
    /// empty identifier.
    pub fn parse(sender: &str) -> Option<Self> {
        let (raw, scheme) = if let Some(raw) = sender.strip_suffix("@lid") {
            (raw, Scheme::Linked)
        } else if let Some(raw) = sender.strip_suffix("@c.us") {
            (raw, Scheme::Phone)
        } else {
            return None;
        };

        if raw.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            scheme,
        })
    }

    /// Identifier with the scheme suffix removed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }
}

/// Normalize `text` into a verification code if it has the code shape:
/// exactly six ASCII letters or digits after trimming, compared upper-cased.
pub fn verification_code(text: &str) -> Option<String> {
    let candidate = text.trim().to_uppercase();
    let is_code = candidate.len() == CODE_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    is_code.then_some(candidate)
}

/// Maps senders to account links.
pub struct IdentityResolver {
    storage: Arc<dyn StorageAdapter>,
    country_code: String,
}

impl IdentityResolver {
    pub fn new(storage: Arc<dyn StorageAdapter>, country_code: impl Into<String>) -> Self {
        Self {
            storage,
            country_code: country_code.into(),
        }
    }

    /// Look up the account linked to `sender`.
    ///
    /// Linked ids are matched directly. Phone-form senders are tried as a
    /// linked id, then as a phone number, then with the country code prefixed.
    pub async fn resolve(&self, sender: &SenderId) -> Result<Option<AccountLink>, BolsoError> {
        if let Some(link) = self.storage.find_link_by_linked_id(sender.raw()).await? {
            return Ok(Some(link));
        }
        if sender.scheme() == Scheme::Linked {
            return Ok(None);
        }

        if let Some(link) = self.storage.find_link_by_phone(sender.raw()).await? {
            return Ok(Some(link));
        }
        if self.country_code.is_empty() || sender.raw().starts_with(&self.country_code) {
            return Ok(None);
        }

        let prefixed = format!("{}{}", self.country_code, sender.raw());
        debug!(phone = %prefixed, "retrying phone lookup with country code");
        self.storage.find_link_by_phone(&prefixed).await
    }

    /// Consume `code` and bind the sender to the matching link.
    pub async fn verify(
        &self,
        code: &str,
        sender: &SenderId,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountLink>, BolsoError> {
        self.storage.verify_and_link(code, sender.raw(), now).await
    }
}
