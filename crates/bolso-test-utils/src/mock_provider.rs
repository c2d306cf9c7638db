// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock AI provider for deterministic testing.
//!
//! Responses are popped from a FIFO queue; each entry is either a text body
//! or an error. Received requests are recorded so tests can inspect the
//! prompt parts.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use bolso_core::BolsoError;
use bolso_core::traits::adapter::PluginAdapter;
use bolso_core::traits::provider::ProviderAdapter;
use bolso_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse};

/// Queued outcome for one `complete()` call.
#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Error(String),
}

/// A mock provider returning pre-configured responses.
///
/// When the queue is empty, an empty transaction list is returned.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with text responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().map(Scripted::Text).collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .await
            .push_back(Scripted::Text(text.into()));
    }

    /// Queue a provider failure.
    pub async fn add_error(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .await
            .push_back(Scripted::Error(message.into()));
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, BolsoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BolsoError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, BolsoError> {
        self.requests.lock().await.push(request);
        let next = self.responses.lock().await.pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(ProviderResponse { text }),
            Some(Scripted::Error(message)) => Err(BolsoError::Provider {
                message,
                source: None,
            }),
            None => Ok(ProviderResponse {
                text: r#"{"transactions": [], "confidence": 0}"#.to_string(),
            }),
        }
    }
}
