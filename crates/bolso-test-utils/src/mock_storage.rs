// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage adapter for deterministic testing.
//!
//! Each trait operation runs under one lock, so verification and usage
//! checks keep the same atomicity the SQLite adapter provides. Failure
//! switches let tests drive the error paths of the intake pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use bolso_core::BolsoError;
use bolso_core::traits::adapter::PluginAdapter;
use bolso_core::traits::storage::StorageAdapter;
use bolso_core::types::{
    AccountLink, AdapterType, HealthStatus, TransactionRecord, UsageDecision, UsageSnapshot,
};

#[derive(Default)]
struct State {
    links: Vec<AccountLink>,
    usage: HashMap<String, UsageSnapshot>,
    transactions: Vec<TransactionRecord>,
}

/// An in-memory storage backend.
#[derive(Default)]
pub struct MockStorage {
    state: Mutex<State>,
    fail_lookups: AtomicBool,
    fail_usage: AtomicBool,
    fail_inserts: AtomicBool,
}

fn injected(what: &str) -> BolsoError {
    BolsoError::Storage {
        source: format!("injected {what} failure").into(),
    }
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_link(&self, link: AccountLink) {
        self.state.lock().await.links.push(link);
    }

    /// Add a verified link for `linked_id`.
    pub async fn add_linked(&self, account_id: &str, linked_id: &str) {
        self.add_link(AccountLink {
            id: format!("link-{account_id}"),
            account_id: account_id.to_string(),
            phone_number: String::new(),
            linked_id: Some(linked_id.to_string()),
            verification_code: None,
            verification_expires_at: None,
            linked_at: Some(Utc::now()),
        })
        .await;
    }

    /// Seed a usage counter.
    pub async fn set_usage(&self, account_id: &str, period: &str, used: u32, limit: u32) {
        self.state.lock().await.usage.insert(
            account_id.to_string(),
            UsageSnapshot {
                period: period.to_string(),
                used,
                limit,
            },
        );
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn fail_usage(&self, fail: bool) {
        self.fail_usage.store(fail, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub async fn transactions(&self) -> Vec<TransactionRecord> {
        self.state.lock().await.transactions.clone()
    }

    pub async fn links(&self) -> Vec<AccountLink> {
        self.state.lock().await.links.clone()
    }

    pub async fn usage(&self, account_id: &str) -> Option<UsageSnapshot> {
        self.state.lock().await.usage.get(account_id).cloned()
    }
}

#[async_trait]
impl PluginAdapter for MockStorage {
    fn name(&self) -> &str {
        "mock-storage"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, BolsoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BolsoError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MockStorage {
    async fn initialize(&self) -> Result<(), BolsoError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), BolsoError> {
        Ok(())
    }

    async fn find_link_by_linked_id(
        &self,
        linked_id: &str,
    ) -> Result<Option<AccountLink>, BolsoError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(injected("lookup"));
        }
        let state = self.state.lock().await;
        Ok(state
            .links
            .iter()
            .find(|l| l.linked_id.as_deref() == Some(linked_id))
            .cloned())
    }

    async fn find_link_by_phone(&self, phone: &str) -> Result<Option<AccountLink>, BolsoError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(injected("lookup"));
        }
        let state = self.state.lock().await;
        Ok(state
            .links
            .iter()
            .find(|l| l.phone_number == phone)
            .cloned())
    }

    async fn verify_and_link(
        &self,
        code: &str,
        linked_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountLink>, BolsoError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(injected("verification"));
        }
        let code = code.trim().to_uppercase();
        let mut state = self.state.lock().await;
        if state
            .links
            .iter()
            .any(|l| l.linked_id.as_deref() == Some(linked_id))
        {
            return Ok(None);
        }
        let Some(link) = state.links.iter_mut().find(|l| {
            l.verification_code.as_deref().map(str::to_uppercase).as_deref() == Some(code.as_str())
                && l.verification_expires_at.is_some_and(|exp| exp > now)
        }) else {
            return Ok(None);
        };
        link.linked_id = Some(linked_id.to_string());
        link.verification_code = None;
        link.verification_expires_at = None;
        link.linked_at = Some(now);
        Ok(Some(link.clone()))
    }

    async fn check_and_increment_usage(
        &self,
        account_id: &str,
        period: &str,
        default_limit: u32,
    ) -> Result<UsageDecision, BolsoError> {
        if self.fail_usage.load(Ordering::SeqCst) {
            return Err(injected("usage"));
        }
        let mut state = self.state.lock().await;
        let counter = state
            .usage
            .entry(account_id.to_string())
            .or_insert_with(|| UsageSnapshot {
                period: period.to_string(),
                used: 0,
                limit: default_limit,
            });
        if counter.period != period {
            counter.period = period.to_string();
            counter.used = 0;
        }
        if counter.used < counter.limit {
            counter.used += 1;
            Ok(UsageDecision {
                allowed: true,
                used: counter.used,
                limit: counter.limit,
            })
        } else {
            Ok(UsageDecision {
                allowed: false,
                used: counter.used,
                limit: counter.limit,
            })
        }
    }

    async fn read_usage(&self, account_id: &str) -> Result<Option<UsageSnapshot>, BolsoError> {
        Ok(self.usage(account_id).await)
    }

    async fn insert_transaction(&self, record: &TransactionRecord) -> Result<(), BolsoError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(injected("insert"));
        }
        self.state.lock().await.transactions.push(record.clone());
        Ok(())
    }
}
