// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monthly quota gate.
//!
//! The check, the period reset and the increment are one atomic storage
//! operation. When the usage store cannot be reached the gate fails open:
//! the message is admitted with `used = 0` and the default limit.

use std::sync::Arc;

use bolso_core::BolsoError;
use bolso_core::StorageAdapter;
use bolso_core::types::{UsageDecision, UsageSnapshot};
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::clock::ReferenceClock;
use crate::metrics;

pub struct QuotaGate {
    storage: Arc<dyn StorageAdapter>,
    clock: ReferenceClock,
    default_limit: u32,
}

impl QuotaGate {
    pub fn new(storage: Arc<dyn StorageAdapter>, clock: ReferenceClock, default_limit: u32) -> Self {
        Self {
            storage,
            clock,
            default_limit,
        }
    }

    /// Admit one message for `account_id` at the current time.
    pub async fn check_and_increment(&self, account_id: &str) -> UsageDecision {
        self.check_and_increment_at(account_id, self.clock.now()).await
    }

    /// Admit one message for `account_id` as of `at`.
    pub async fn check_and_increment_at(&self, account_id: &str, at: DateTime<Utc>) -> UsageDecision {
        let period = self.clock.period_key(at);
        match self
            .storage
            .check_and_increment_usage(account_id, &period, self.default_limit)
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                warn!(account_id, period = %period, error = %e, "usage store unavailable, failing open");
                metrics::record_quota_fail_open();
                UsageDecision {
                    allowed: true,
                    used: 0,
                    limit: self.default_limit,
                }
            }
        }
    }

    /// Read the counter without consuming quota.
    pub async fn read_usage(&self, account_id: &str) -> Result<Option<UsageSnapshot>, BolsoError> {
        self.storage.read_usage(account_id).await
    }
}
