// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that every collaborator implements.

use async_trait::async_trait;

use crate::error::BolsoError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all bolso collaborator adapters.
///
/// Every adapter (transport, AI provider, storage) provides identity,
/// health reporting, and a shutdown hook.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of collaborator this adapter stands for.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, BolsoError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), BolsoError>;
}
