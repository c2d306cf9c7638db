// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for the bolso intake relay.
//!
//! Implements [`ProviderAdapter`] on top of the `generateContent` endpoint.
//! Text and inline media parts are forwarded as-is; the response text of the
//! first candidate is returned for the intake pipeline to parse.

pub mod client;
pub mod types;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bolso_config::model::GeminiConfig;
use bolso_core::error::BolsoError;
use bolso_core::traits::{PluginAdapter, ProviderAdapter};
use bolso_core::types::{AdapterType, HealthStatus, PromptPart, ProviderRequest, ProviderResponse};
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, InlineData, Part};

/// Gemini provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiProvider {
    client: GeminiClient,
    json_mode: bool,
}

impl GeminiProvider {
    /// Creates a provider from the `[gemini]` config section.
    pub fn new(config: &GeminiConfig) -> Result<Self, BolsoError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(
            &api_key,
            config.model.clone(),
            config.base_url.clone(),
            config.max_retries,
        )?;
        info!(model = %config.model, json_mode = config.json_mode, "Gemini provider initialized");
        Ok(Self {
            client,
            json_mode: config.json_mode,
        })
    }

    fn to_api_request(&self, request: &ProviderRequest) -> GenerateContentRequest {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                PromptPart::Text(text) => Part::Text { text: text.clone() },
                PromptPart::InlineData { mime_type, data } => Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.clone(),
                        data: STANDARD.encode(data),
                    },
                },
            })
            .collect();

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: self.json_mode.then(|| GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
            }),
        }
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, BolsoError> {
        // No API call: health checks must not spend quota.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BolsoError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, BolsoError> {
        let api_request = self.to_api_request(&request);
        let response = self.client.generate_content(&api_request).await?;

        match response.text() {
            Some(text) => Ok(ProviderResponse { text }),
            None => {
                warn!(feedback = ?response.prompt_feedback, "Gemini returned no candidate text");
                Err(BolsoError::Provider {
                    message: "response contained no candidate text".to_string(),
                    source: None,
                })
            }
        }
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, BolsoError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("GEMINI_API_KEY").map_err(|_| {
        BolsoError::Config(
            "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY environment variable.".into(),
        )
    })
}
