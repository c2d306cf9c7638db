// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the intake pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a message delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Short label used in health reports.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded(_) => "degraded",
            HealthStatus::Unhealthy(_) => "unhealthy",
        }
    }
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
}

// --- Inbound side ---

/// Kind of platform notification carried by a webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A new chat message.
    Message,
    /// Anything else (acks, presence, session status...).
    Other(String),
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        if value == "message" {
            EventKind::Message
        } else {
            EventKind::Other(value.to_string())
        }
    }
}

/// Content discriminator of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
    Text,
    Image,
    Voice,
    Other,
}

/// One messaging-platform notification, built once per webhook call.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Platform message id, when present.
    pub id: Option<String>,
    pub kind: EventKind,
    /// True when the message was sent by the connected account itself.
    pub from_me: bool,
    /// Raw sender identifier, e.g. `226744275624053@lid` or `5511999999999@c.us`.
    pub sender: String,
    pub body: Option<String>,
    pub content_kind: ContentKind,
    pub has_media: bool,
    /// Absolute URL or transport-relative path of the attached media.
    pub media_url: Option<String>,
    /// Unix timestamp (seconds) reported by the platform.
    pub timestamp: i64,
}

impl InboundEvent {
    /// Body text with surrounding whitespace removed, if non-empty.
    pub fn trimmed_body(&self) -> Option<&str> {
        self.body
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}

/// Downloaded media bytes with their content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// A plain-text message to deliver to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Full platform chat id (with scheme suffix).
    pub chat_id: String,
    pub text: String,
}

// --- Identity and quota ---

/// Association between a messaging identity and an application account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLink {
    /// Row identifier of the link.
    pub id: String,
    /// Owning application account.
    pub account_id: String,
    pub phone_number: String,
    /// Platform-linked identifier, set once verification succeeds.
    pub linked_id: Option<String>,
    /// Pending single-use verification code.
    pub verification_code: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
    /// When the link was confirmed.
    pub linked_at: Option<DateTime<Utc>>,
}

/// Result of an atomic check-and-increment on the usage counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDecision {
    pub allowed: bool,
    /// Messages used this period, including the admitted one.
    pub used: u32,
    pub limit: u32,
}

impl UsageDecision {
    /// Messages left in the period (saturating).
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }
}

/// Read-only view of an account's usage counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Period key, `YYYY-MM`.
    pub period: String,
    pub used: u32,
    pub limit: u32,
}

// --- Transactions ---

/// Direction of a transaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Fixed set of transaction categories understood by the app.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    FixedHousing,
    FixedUtilities,
    FixedSubscriptions,
    FixedPersonal,
    FixedTaxes,
    VariableCredit,
    VariableFood,
    VariableTransport,
    VariableOther,
}

/// Lifecycle status of a stored transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionStatus {
    Planned,
    Completed,
}

/// An unvalidated-then-validated extraction result, never persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTransaction {
    pub description: String,
    /// Always strictly positive once validated.
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: Option<Category>,
}

/// A persisted transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub account_id: String,
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: Option<Category>,
    pub due_date: NaiveDate,
    pub status: TransactionStatus,
    /// Free-text provenance note.
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

// --- Provider ---

/// One part of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPart {
    Text(String),
    InlineData { mime_type: String, data: Vec<u8> },
}

/// A request to the AI extraction capability.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    pub parts: Vec<PromptPart>,
}

/// Free-form text returned by the AI extraction capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub text: String,
}
