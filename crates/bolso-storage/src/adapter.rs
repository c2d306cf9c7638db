// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use bolso_config::model::StorageConfig;
use bolso_core::types::{AccountLink, TransactionRecord, UsageDecision, UsageSnapshot};
use bolso_core::{AdapterType, BolsoError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::crypto::FieldCipher;
use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened on the first call to [`StorageAdapter::initialize`].
/// When the config carries an encryption key, transaction fields are sealed
/// with [`FieldCipher`] before they reach the database.
pub struct SqliteStorage {
    config: StorageConfig,
    cipher: Option<FieldCipher>,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a storage adapter; fails only on a malformed encryption key.
    pub fn new(config: StorageConfig) -> Result<Self, BolsoError> {
        let cipher = config
            .encryption_key
            .as_deref()
            .map(FieldCipher::from_base64)
            .transpose()?;
        Ok(Self {
            config,
            cipher,
            db: OnceCell::new(),
        })
    }

    fn db(&self) -> Result<&Database, BolsoError> {
        self.db.get().ok_or_else(|| BolsoError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// True when transaction fields are encrypted at rest.
    pub fn encrypts_fields(&self) -> bool {
        self.cipher.is_some()
    }

    /// Insert an account link row.
    pub async fn insert_link(&self, link: &AccountLink) -> Result<(), BolsoError> {
        queries::links::insert_link(self.db()?, link).await
    }

    /// Set a custom monthly limit for an account.
    pub async fn set_monthly_limit(
        &self,
        account_id: &str,
        period: &str,
        limit: u32,
    ) -> Result<(), BolsoError> {
        queries::usage::set_limit(self.db()?, account_id, period, limit).await
    }

    /// All stored transactions for an account, decrypted.
    pub async fn list_transactions(
        &self,
        account_id: &str,
    ) -> Result<Vec<TransactionRecord>, BolsoError> {
        queries::transactions::list_for_account(self.db()?, account_id, self.cipher.as_ref()).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, BolsoError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BolsoError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), BolsoError> {
        let db = Database::open_with_options(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| BolsoError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(
            path = %self.config.database_path,
            encrypted = self.cipher.is_some(),
            "SQLite storage initialized"
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), BolsoError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn find_link_by_linked_id(
        &self,
        linked_id: &str,
    ) -> Result<Option<AccountLink>, BolsoError> {
        queries::links::find_by_linked_id(self.db()?, linked_id).await
    }

    async fn find_link_by_phone(&self, phone: &str) -> Result<Option<AccountLink>, BolsoError> {
        queries::links::find_by_phone(self.db()?, phone).await
    }

    async fn verify_and_link(
        &self,
        code: &str,
        linked_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountLink>, BolsoError> {
        queries::links::verify_and_link(self.db()?, code, linked_id, now).await
    }

    async fn check_and_increment_usage(
        &self,
        account_id: &str,
        period: &str,
        default_limit: u32,
    ) -> Result<UsageDecision, BolsoError> {
        queries::usage::check_and_increment(self.db()?, account_id, period, default_limit).await
    }

    async fn read_usage(&self, account_id: &str) -> Result<Option<UsageSnapshot>, BolsoError> {
        queries::usage::read_usage(self.db()?, account_id).await
    }

    async fn insert_transaction(&self, record: &TransactionRecord) -> Result<(), BolsoError> {
        queries::transactions::insert_transaction(self.db()?, record, self.cipher.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
            encryption_key: None,
        }
    }

    async fn initialized(dir: &tempfile::TempDir) -> Arc<SqliteStorage> {
        let path = dir.path().join("adapter.db");
        let storage = SqliteStorage::new(make_config(path.to_str().unwrap())).unwrap();
        storage.initialize().await.unwrap();
        Arc::new(storage)
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(dir.path().join("t.db").to_str().unwrap()))
            .unwrap();
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn calls_before_initialize_fail() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(dir.path().join("t.db").to_str().unwrap()))
            .unwrap();
        assert!(storage.find_link_by_linked_id("x").await.is_err());
    }

    #[tokio::test]
    async fn double_initialize_fails() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir).await;
        assert!(storage.initialize().await.is_err());
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        storage.shutdown().await.unwrap();
    }

    #[test]
    fn bad_encryption_key_is_rejected() {
        let mut config = make_config("unused.db");
        config.encryption_key = Some("dG9vIHNob3J0".to_string());
        assert!(matches!(SqliteStorage::new(config), Err(BolsoError::Crypto(_))));
    }

    #[tokio::test]
    async fn concurrent_verification_links_once() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir).await;
        let now = Utc::now();
        storage
            .insert_link(&AccountLink {
                id: "l1".into(),
                account_id: "acct-1".into(),
                phone_number: "5511999990000".into(),
                linked_id: None,
                verification_code: Some("QW12ER".into()),
                verification_expires_at: Some(now + chrono::Duration::minutes(5)),
                linked_at: None,
            })
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                storage
                    .verify_and_link("qw12er", &format!("lid-{i}"), now)
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn concurrent_codes_from_one_sender_link_once() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir).await;
        let now = Utc::now();
        for (id, code) in [("l1", "AAA111"), ("l2", "BBB222")] {
            storage
                .insert_link(&AccountLink {
                    id: id.into(),
                    account_id: format!("acct-{id}"),
                    phone_number: format!("55119999{id}"),
                    linked_id: None,
                    verification_code: Some(code.into()),
                    verification_expires_at: Some(now + chrono::Duration::minutes(5)),
                    linked_at: None,
                })
                .await
                .unwrap();
        }

        let a = {
            let storage = Arc::clone(&storage);
            tokio::spawn(async move { storage.verify_and_link("AAA111", "999", now).await })
        };
        let b = {
            let storage = Arc::clone(&storage);
            tokio::spawn(async move { storage.verify_and_link("BBB222", "999", now).await })
        };
        let a = a.await.unwrap().expect("no storage error");
        let b = b.await.unwrap().expect("no storage error");
        assert_eq!(a.is_some() as u8 + b.is_some() as u8, 1);
    }

    #[tokio::test]
    async fn concurrent_usage_never_exceeds_limit() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir).await;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                storage
                    .check_and_increment_usage("acct-1", "2026-03", 5)
                    .await
                    .unwrap()
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap().allowed {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 5);
        assert_eq!(storage.read_usage("acct-1").await.unwrap().unwrap().used, 5);
    }

    #[tokio::test]
    async fn encrypted_storage_round_trips_through_adapter() {
        use base64::Engine;
        let dir = tempdir().unwrap();
        let mut config = make_config(dir.path().join("enc.db").to_str().unwrap());
        config.encryption_key =
            Some(base64::engine::general_purpose::STANDARD.encode([9u8; 32]));
        let storage = SqliteStorage::new(config).unwrap();
        assert!(storage.encrypts_fields());
        storage.initialize().await.unwrap();

        let record = TransactionRecord {
            id: "t1".into(),
            account_id: "acct-1".into(),
            description: "Salário".into(),
            amount: 3000.0,
            kind: bolso_core::types::TransactionKind::Income,
            category: None,
            due_date: chrono::NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            status: bolso_core::types::TransactionStatus::Planned,
            notes: "Criado via WhatsApp".into(),
            created_at: Utc::now(),
        };
        storage.insert_transaction(&record).await.unwrap();

        let rows = storage.list_transactions("acct-1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Salário");
        assert_eq!(rows[0].amount, 3000.0);
    }
}
