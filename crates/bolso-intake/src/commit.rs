// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persists validated candidates and composes the confirmation reply.

use std::sync::Arc;

use bolso_config::model::QuotaConfig;
use bolso_core::StorageAdapter;
use bolso_core::types::{CandidateTransaction, TransactionRecord, TransactionStatus, UsageDecision};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::clock::ReferenceClock;
use crate::metrics;
use crate::replies;

/// Provenance note stored on every record.
pub const NOTES: &str = "Criado via WhatsApp";

/// Thresholds for the low-quota suffix.
#[derive(Debug, Clone)]
pub struct WarningPolicy {
    pub unlimited_threshold: u32,
    pub warning_ratio: f64,
    pub upgrade_remaining: u32,
    pub upgrade_url: String,
}

impl From<&QuotaConfig> for WarningPolicy {
    fn from(config: &QuotaConfig) -> Self {
        Self {
            unlimited_threshold: config.unlimited_threshold,
            warning_ratio: config.warning_ratio,
            upgrade_remaining: config.upgrade_remaining,
            upgrade_url: config.upgrade_url.clone(),
        }
    }
}

/// Suffix to append for `usage`, if any.
///
/// Limits at or above the unlimited threshold never warn.
pub fn usage_warning(usage: &UsageDecision, policy: &WarningPolicy) -> Option<String> {
    if usage.limit == 0 || usage.limit >= policy.unlimited_threshold {
        return None;
    }
    let ratio = f64::from(usage.used) / f64::from(usage.limit);
    if ratio < policy.warning_ratio {
        return None;
    }

    let remaining = usage.remaining();
    let mut suffix = replies::remaining_warning(remaining);
    if remaining <= policy.upgrade_remaining {
        suffix.push_str(&replies::upgrade_cta(&policy.upgrade_url));
    }
    Some(suffix)
}

/// What a commit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub stored: usize,
    pub failed: usize,
    /// Confirmation text; `None` when nothing was stored.
    pub reply: Option<String>,
}

pub struct TransactionCommitter {
    storage: Arc<dyn StorageAdapter>,
    clock: ReferenceClock,
    policy: WarningPolicy,
}

impl TransactionCommitter {
    pub fn new(storage: Arc<dyn StorageAdapter>, clock: ReferenceClock, policy: WarningPolicy) -> Self {
        Self {
            storage,
            clock,
            policy,
        }
    }

    pub async fn commit(
        &self,
        account_id: &str,
        candidates: &[CandidateTransaction],
        usage: &UsageDecision,
    ) -> CommitReport {
        self.commit_at(account_id, candidates, usage, self.clock.now()).await
    }

    /// Insert each candidate independently, dated on the local day of `now`.
    pub async fn commit_at(
        &self,
        account_id: &str,
        candidates: &[CandidateTransaction],
        usage: &UsageDecision,
        now: DateTime<Utc>,
    ) -> CommitReport {
        let due_date = self.clock.local_date(now);
        let mut lines = Vec::with_capacity(candidates.len());
        let mut failed = 0;

        for candidate in candidates {
            let record = TransactionRecord {
                id: uuid::Uuid::new_v4().to_string(),
                account_id: account_id.to_string(),
                description: candidate.description.clone(),
                amount: candidate.amount,
                kind: candidate.kind,
                category: candidate.category,
                due_date,
                status: TransactionStatus::Planned,
                notes: NOTES.to_string(),
                created_at: now,
            };
            match self.storage.insert_transaction(&record).await {
                Ok(()) => lines.push(replies::transaction_line(candidate)),
                Err(e) => {
                    failed += 1;
                    warn!(account_id, transaction_id = %record.id, error = %e, "failed to store transaction");
                }
            }
        }

        let stored = lines.len();
        metrics::record_transactions(stored, failed);
        info!(account_id, stored, failed, "transactions committed");

        let reply = replies::confirmation(&lines).map(|mut text| {
            if let Some(suffix) = usage_warning(usage, &self.policy) {
                text.push_str(&suffix);
            }
            text
        });

        CommitReport {
            stored,
            failed,
            reply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bolso_core::types::TransactionKind;
    use bolso_test_utils::MockStorage;
    use chrono::{NaiveDate, TimeZone};
    use proptest::prelude::*;

    fn policy() -> WarningPolicy {
        WarningPolicy::from(&QuotaConfig::default())
    }

    fn usage(used: u32, limit: u32) -> UsageDecision {
        UsageDecision {
            allowed: true,
            used,
            limit,
        }
    }

    fn uber() -> CandidateTransaction {
        CandidateTransaction {
            description: "Uber".into(),
            amount: 50.0,
            kind: TransactionKind::Expense,
            category: None,
        }
    }

    fn committer(storage: Arc<MockStorage>) -> TransactionCommitter {
        TransactionCommitter::new(
            storage,
            ReferenceClock::from_offset_minutes(-180).unwrap(),
            policy(),
        )
    }

    #[test]
    fn no_warning_below_ratio() {
        assert_eq!(usage_warning(&usage(23, 30), &policy()), None);
    }

    #[test]
    fn warning_without_upgrade() {
        // 80/100: ratio reached, 20 remaining is above the upgrade threshold.
        let text = usage_warning(&usage(80, 100), &policy()).unwrap();
        assert!(text.contains("20 mensagens restantes"));
        assert!(!text.contains("upgrade"));
    }

    #[test]
    fn warning_with_upgrade() {
        let text = usage_warning(&usage(29, 30), &policy()).unwrap();
        assert!(text.contains("1 mensagem restante"));
        assert!(text.contains("https://meubolso.app/planos"));
    }

    #[test]
    fn upgrade_cta_starts_at_five_remaining() {
        let text = usage_warning(&usage(25, 30), &policy()).unwrap();
        assert!(text.contains("5 mensagens restantes"));
        assert!(text.contains("https://meubolso.app/planos"));

        let text = usage_warning(&usage(24, 30), &policy()).unwrap();
        assert!(text.contains("6 mensagens restantes"));
        assert!(!text.contains("upgrade"));
    }

    proptest! {
        #[test]
        fn warning_tracks_ratio_and_remaining(limit in 1u32..200, used_frac in 0.0f64..=1.0) {
            let used = (f64::from(limit) * used_frac).floor() as u32;
            let warning = usage_warning(&usage(used, limit), &policy());
            let warns = f64::from(used) / f64::from(limit) >= 0.8;
            prop_assert_eq!(warning.is_some(), warns);
            if let Some(text) = warning {
                prop_assert_eq!(text.contains("meubolso.app/planos"), limit - used <= 5);
            }
        }

        #[test]
        fn unlimited_limits_never_warn(limit in 100_000u32..1_000_000, used in 0u32..1_000_000) {
            prop_assert!(usage_warning(&usage(used, limit), &policy()).is_none());
        }
    }

    #[test]
    fn unlimited_plan_never_warns() {
        assert_eq!(usage_warning(&usage(99_999, 100_000), &policy()), None);
        assert_eq!(usage_warning(&usage(0, 0), &policy()), None);
    }

    #[tokio::test]
    async fn stores_records_with_local_due_date() {
        let storage = Arc::new(MockStorage::new());
        let now = Utc.with_ymd_and_hms(2026, 3, 8, 2, 30, 0).unwrap();
        let report = committer(storage.clone())
            .commit_at("acct", &[uber()], &usage(1, 30), now)
            .await;

        assert_eq!(report.stored, 1);
        assert_eq!(report.reply.as_deref(), Some("✅ Transação registrada!\n\n💸 Uber: R$ 50,00"));

        let stored = storage.transactions().await;
        assert_eq!(stored[0].due_date, NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());
        assert_eq!(stored[0].status, TransactionStatus::Planned);
        assert_eq!(stored[0].notes, NOTES);
        assert_eq!(stored[0].account_id, "acct");
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn all_inserts_failing_yields_no_reply() {
        let storage = Arc::new(MockStorage::new());
        storage.fail_inserts(true);
        let report = committer(storage)
            .commit("acct", &[uber(), uber()], &usage(1, 30))
            .await;
        assert_eq!(report, CommitReport { stored: 0, failed: 2, reply: None });
        assert!(logs_contain("failed to store transaction"));
    }
}
