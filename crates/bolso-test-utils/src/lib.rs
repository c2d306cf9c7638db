// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for bolso integration tests.
//!
//! Provides mock adapters for fast, deterministic tests without a WAHA
//! instance, a Gemini key, or a database file.
//!
//! # Components
//!
//! - [`MockChannel`] - captures outbound messages and serves canned media
//! - [`MockProvider`] - returns pre-configured extraction responses
//! - [`MockStorage`] - in-memory links, usage counters, and transactions

pub mod mock_channel;
pub mod mock_provider;
pub mod mock_storage;

pub use mock_channel::MockChannel;
pub use mock_provider::MockProvider;
pub use mock_storage::MockStorage;
