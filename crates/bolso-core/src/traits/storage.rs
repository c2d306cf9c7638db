// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the persistence backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::BolsoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AccountLink, TransactionRecord, UsageDecision, UsageSnapshot};

/// Adapter for account links, usage counters, and transaction records.
///
/// Two operations carry atomicity contracts that implementations must honor
/// at the storage layer: [`verify_and_link`](StorageAdapter::verify_and_link)
/// and [`check_and_increment_usage`](StorageAdapter::check_and_increment_usage).
/// The pipeline does no locking of its own.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), BolsoError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), BolsoError>;

    // --- Account links ---

    /// Looks up a link by its platform-linked identifier.
    async fn find_link_by_linked_id(
        &self,
        linked_id: &str,
    ) -> Result<Option<AccountLink>, BolsoError>;

    /// Looks up a link by phone number (legacy addressing).
    async fn find_link_by_phone(&self, phone: &str) -> Result<Option<AccountLink>, BolsoError>;

    /// Consumes a pending verification code and binds `linked_id` to its link.
    ///
    /// Matches the code case-insensitively with an expiry strictly after
    /// `now`. Must be a single conditional update: of two concurrent calls
    /// with the same code at most one returns `Some`.
    async fn verify_and_link(
        &self,
        code: &str,
        linked_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountLink>, BolsoError>;

    // --- Usage counters ---

    /// Atomically resets the counter if `period` is new, then admits and
    /// increments it when below the limit.
    ///
    /// Counters are created on first use with `default_limit`.
    async fn check_and_increment_usage(
        &self,
        account_id: &str,
        period: &str,
        default_limit: u32,
    ) -> Result<UsageDecision, BolsoError>;

    /// Reads the usage counter without modifying it.
    async fn read_usage(&self, account_id: &str) -> Result<Option<UsageSnapshot>, BolsoError>;

    // --- Transactions ---

    /// Inserts one transaction record.
    async fn insert_transaction(&self, record: &TransactionRecord) -> Result<(), BolsoError>;
}
