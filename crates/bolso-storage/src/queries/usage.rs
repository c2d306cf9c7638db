// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monthly usage counter.

use bolso_core::BolsoError;
use bolso_core::types::{UsageDecision, UsageSnapshot};
use chrono::Utc;
use rusqlite::{TransactionBehavior, params};

use crate::database::{Database, format_ts, map_tr_err};

/// Atomically admit one message for `account_id` in `period`.
///
/// Creates the counter with `default_limit` on first use and resets it when
/// `period` differs from the stored one. The increment only happens while
/// `used < monthly_limit`, inside one immediate transaction.
pub async fn check_and_increment(
    db: &Database,
    account_id: &str,
    period: &str,
    default_limit: u32,
) -> Result<UsageDecision, BolsoError> {
    let account_id = account_id.to_string();
    let period = period.to_string();
    let now = format_ts(&Utc::now());
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            tx.execute(
                "INSERT INTO message_usage (account_id, period, used, monthly_limit, updated_at) \
                 VALUES (?1, ?2, 0, ?3, ?4) \
                 ON CONFLICT(account_id) DO UPDATE SET \
                     used = CASE WHEN message_usage.period = excluded.period \
                                 THEN message_usage.used ELSE 0 END, \
                     period = excluded.period, \
                     updated_at = excluded.updated_at",
                params![account_id, period, default_limit, now],
            )?;

            let admitted = tx.query_row(
                "UPDATE message_usage SET used = used + 1 \
                 WHERE account_id = ?1 AND used < monthly_limit \
                 RETURNING used, monthly_limit",
                params![account_id],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
            );

            let decision = match admitted {
                Ok((used, limit)) => UsageDecision {
                    allowed: true,
                    used,
                    limit,
                },
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    let (used, limit) = tx.query_row(
                        "SELECT used, monthly_limit FROM message_usage WHERE account_id = ?1",
                        params![account_id],
                        |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
                    )?;
                    UsageDecision {
                        allowed: false,
                        used,
                        limit,
                    }
                }
                Err(e) => return Err(e),
            };

            tx.commit()?;
            Ok(decision)
        })
        .await
        .map_err(map_tr_err)
}

/// Read the counter without changing it.
pub async fn read_usage(db: &Database, account_id: &str) -> Result<Option<UsageSnapshot>, BolsoError> {
    let account_id = account_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT period, used, monthly_limit FROM message_usage WHERE account_id = ?1",
                params![account_id],
                |row| {
                    Ok(UsageSnapshot {
                        period: row.get(0)?,
                        used: row.get(1)?,
                        limit: row.get(2)?,
                    })
                },
            );
            match result {
                Ok(snapshot) => Ok(Some(snapshot)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Override an account's monthly limit, creating the counter if needed.
pub async fn set_limit(db: &Database, account_id: &str, period: &str, limit: u32) -> Result<(), BolsoError> {
    let account_id = account_id.to_string();
    let period = period.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO message_usage (account_id, period, used, monthly_limit) \
                 VALUES (?1, ?2, 0, ?3) \
                 ON CONFLICT(account_id) DO UPDATE SET monthly_limit = excluded.monthly_limit",
                params![account_id, period, limit],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
