// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account link lookups and single-use code verification.

use bolso_core::BolsoError;
use bolso_core::types::AccountLink;
use chrono::{DateTime, Utc};
use rusqlite::{Row, params};

use crate::database::{Database, format_ts, map_tr_err, parse_ts};

const LINK_COLUMNS: &str = "id, account_id, phone_number, linked_id, verification_code, \
                            verification_expires_at, linked_at";

fn row_to_link(row: &Row<'_>) -> Result<AccountLink, rusqlite::Error> {
    let expires: Option<String> = row.get(5)?;
    let linked_at: Option<String> = row.get(6)?;
    Ok(AccountLink {
        id: row.get(0)?,
        account_id: row.get(1)?,
        phone_number: row.get(2)?,
        linked_id: row.get(3)?,
        verification_code: row.get(4)?,
        verification_expires_at: expires.as_deref().map(|s| parse_ts(5, s)).transpose()?,
        linked_at: linked_at.as_deref().map(|s| parse_ts(6, s)).transpose()?,
    })
}

/// Insert a link row. Links are normally created by the app when the user
/// requests a verification code.
pub async fn insert_link(db: &Database, link: &AccountLink) -> Result<(), BolsoError> {
    let link = link.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO account_links (id, account_id, phone_number, linked_id, \
                 verification_code, verification_expires_at, linked_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    link.id,
                    link.account_id,
                    link.phone_number,
                    link.linked_id,
                    link.verification_code,
                    link.verification_expires_at.as_ref().map(format_ts),
                    link.linked_at.as_ref().map(format_ts),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

async fn find_one(db: &Database, column: &'static str, value: &str) -> Result<Option<AccountLink>, BolsoError> {
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {LINK_COLUMNS} FROM account_links WHERE {column} = ?1 LIMIT 1");
            let mut stmt = conn.prepare(&sql)?;
            match stmt.query_row(params![value], row_to_link) {
                Ok(link) => Ok(Some(link)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Find the link whose platform-linked id equals `linked_id`.
pub async fn find_by_linked_id(db: &Database, linked_id: &str) -> Result<Option<AccountLink>, BolsoError> {
    find_one(db, "linked_id", linked_id).await
}

/// Find a link by stored phone number (exact match).
pub async fn find_by_phone(db: &Database, phone: &str) -> Result<Option<AccountLink>, BolsoError> {
    find_one(db, "phone_number", phone).await
}

/// Consume a pending verification code and bind `linked_id` to its link.
///
/// Matching is case-insensitive and requires `expires_at > now`. The select
/// and update are one statement, so of two concurrent callers presenting the
/// same code exactly one gets `Some`. An identifier that is already bound
/// elsewhere is a miss, not a constraint error.
pub async fn verify_and_link(
    db: &Database,
    code: &str,
    linked_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<AccountLink>, BolsoError> {
    let code = code.trim().to_uppercase();
    let linked_id = linked_id.to_string();
    let now = format_ts(&now);
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "UPDATE account_links \
                 SET linked_id = ?1, verification_code = NULL, \
                     verification_expires_at = NULL, linked_at = ?2 \
                 WHERE id = (SELECT id FROM account_links \
                             WHERE verification_code IS NOT NULL \
                               AND UPPER(verification_code) = ?3 \
                               AND verification_expires_at > ?2 \
                             ORDER BY verification_expires_at DESC LIMIT 1) \
                   AND UPPER(verification_code) = ?3 \
                   AND NOT EXISTS (SELECT 1 FROM account_links WHERE linked_id = ?1) \
                 RETURNING {LINK_COLUMNS}"
            );
            let mut stmt = conn.prepare(&sql)?;
            match stmt.query_row(params![linked_id, now, code], row_to_link) {
                Ok(link) => Ok(Some(link)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}
