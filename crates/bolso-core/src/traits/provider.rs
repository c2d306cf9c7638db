// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the AI extraction capability.

use async_trait::async_trait;

use crate::error::BolsoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for a multimodal language model.
///
/// The provider only transports the prompt and returns whatever text the
/// model produced; parsing and validation live in the intake pipeline.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a single generation request and returns the full text response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, BolsoError>;
}
