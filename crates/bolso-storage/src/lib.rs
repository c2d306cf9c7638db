// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the bolso intake relay.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. The two operations
//! that must be race-free (code verification and the usage counter) are each
//! a single statement or a single immediate transaction on that writer.

pub mod adapter;
pub mod crypto;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use crypto::FieldCipher;
pub use database::Database;
