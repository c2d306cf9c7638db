// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the bolso WhatsApp intake relay.
//!
//! Defines the error type, the domain types that flow through the intake
//! pipeline, and the collaborator traits (transport, media, AI provider,
//! storage) that concrete adapter crates implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::BolsoError;
pub use types::{AdapterType, HealthStatus, MessageId};

pub use traits::{ChannelAdapter, MediaFetcher, PluginAdapter, ProviderAdapter, StorageAdapter};
