// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transaction inserts and reads, with optional field encryption.

use std::str::FromStr;

use bolso_core::BolsoError;
use bolso_core::types::{Category, TransactionKind, TransactionRecord, TransactionStatus};
use chrono::NaiveDate;
use rusqlite::params;

use crate::crypto::FieldCipher;
use crate::database::{Database, format_ts, map_tr_err, parse_ts};

/// Column values as they are written to disk.
struct StoredFields {
    description: String,
    amount: String,
    notes: String,
    encrypted: bool,
}

fn seal_fields(record: &TransactionRecord, cipher: Option<&FieldCipher>) -> Result<StoredFields, BolsoError> {
    let amount = record.amount.to_string();
    match cipher {
        Some(c) => Ok(StoredFields {
            description: c.seal(&record.description)?,
            amount: c.seal(&amount)?,
            notes: c.seal(&record.notes)?,
            encrypted: true,
        }),
        None => Ok(StoredFields {
            description: record.description.clone(),
            amount,
            notes: record.notes.clone(),
            encrypted: false,
        }),
    }
}

/// Insert one transaction. Sensitive fields are sealed when `cipher` is set.
pub async fn insert_transaction(
    db: &Database,
    record: &TransactionRecord,
    cipher: Option<&FieldCipher>,
) -> Result<(), BolsoError> {
    let fields = seal_fields(record, cipher)?;
    let id = record.id.clone();
    let account_id = record.account_id.clone();
    let kind = record.kind.to_string();
    let category = record.category.map(|c| c.to_string());
    let due_date = record.due_date.format("%Y-%m-%d").to_string();
    let status = record.status.to_string();
    let created_at = format_ts(&record.created_at);

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO transactions (id, account_id, description, amount, type, category, \
                 due_date, status, notes, encrypted, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    id,
                    account_id,
                    fields.description,
                    fields.amount,
                    kind,
                    category,
                    due_date,
                    status,
                    fields.notes,
                    fields.encrypted,
                    created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Raw row before decryption.
struct RawRow {
    id: String,
    account_id: String,
    description: String,
    amount: String,
    kind: String,
    category: Option<String>,
    due_date: String,
    status: String,
    notes: Option<String>,
    encrypted: bool,
    created_at: String,
}

fn decode(raw: RawRow, cipher: Option<&FieldCipher>) -> Result<TransactionRecord, BolsoError> {
    let reveal = |value: String| -> Result<String, BolsoError> {
        if !raw.encrypted {
            return Ok(value);
        }
        match cipher {
            Some(c) => c.open(&value),
            None => Err(BolsoError::Crypto(
                "row is encrypted but no encryption key is configured".to_string(),
            )),
        }
    };

    let amount = reveal(raw.amount)?;
    let amount = amount
        .parse::<f64>()
        .map_err(|e| BolsoError::Internal(format!("stored amount `{amount}` is not a number: {e}")))?;
    let kind = TransactionKind::from_str(&raw.kind)
        .map_err(|e| BolsoError::Internal(format!("stored type `{}`: {e}", raw.kind)))?;
    let status = TransactionStatus::from_str(&raw.status)
        .map_err(|e| BolsoError::Internal(format!("stored status `{}`: {e}", raw.status)))?;
    let due_date = NaiveDate::parse_from_str(&raw.due_date, "%Y-%m-%d")
        .map_err(|e| BolsoError::Internal(format!("stored due_date `{}`: {e}", raw.due_date)))?;
    let created_at = parse_ts(10, &raw.created_at).map_err(BolsoError::storage)?;

    Ok(TransactionRecord {
        id: raw.id,
        account_id: raw.account_id,
        description: reveal(raw.description)?,
        amount,
        kind,
        category: raw.category.as_deref().and_then(|c| Category::from_str(c).ok()),
        due_date,
        status,
        notes: raw.notes.map(reveal).transpose()?.unwrap_or_default(),
        created_at,
    })
}

/// All transactions for an account, oldest first.
pub async fn list_for_account(
    db: &Database,
    account_id: &str,
    cipher: Option<&FieldCipher>,
) -> Result<Vec<TransactionRecord>, BolsoError> {
    let account_id = account_id.to_string();
    let rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, account_id, description, amount, type, category, due_date, status, \
                 notes, encrypted, created_at \
                 FROM transactions WHERE account_id = ?1 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![account_id], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    account_id: row.get(1)?,
                    description: row.get(2)?,
                    amount: row.get(3)?,
                    kind: row.get(4)?,
                    category: row.get(5)?,
                    due_date: row.get(6)?,
                    status: row.get(7)?,
                    notes: row.get(8)?,
                    encrypted: row.get(9)?,
                    created_at: row.get(10)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter().map(|raw| decode(raw, cipher)).collect()
}
