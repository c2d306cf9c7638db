// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WAHA (WhatsApp HTTP API) channel adapter for the bolso intake relay.
//!
//! Inbound traffic arrives on the gateway's webhook route as [`WahaWebhook`]
//! payloads; this crate converts them into [`InboundEvent`]s and implements
//! the outbound side ([`ChannelAdapter`]) plus media downloads
//! ([`MediaFetcher`]).
//!
//! [`InboundEvent`]: bolso_core::types::InboundEvent

pub mod client;
pub mod types;

use async_trait::async_trait;
use bolso_config::model::WahaConfig;
use bolso_core::error::BolsoError;
use bolso_core::traits::{ChannelAdapter, MediaFetcher, PluginAdapter};
use bolso_core::types::{AdapterType, HealthStatus, MediaPayload, MessageId, OutboundMessage};
use tracing::{debug, info};

pub use client::{WahaClient, resolve_media_url};
pub use types::WahaWebhook;

/// WhatsApp transport backed by a WAHA container.
pub struct WahaChannel {
    client: WahaClient,
}

impl WahaChannel {
    /// Creates the adapter from the `[waha]` config section.
    pub fn new(config: &WahaConfig) -> Result<Self, BolsoError> {
        let client = WahaClient::new(
            &config.api_url,
            config.session.clone(),
            config.api_key.as_deref(),
        )?;
        info!(api_url = %config.api_url, session = %config.session, "WAHA channel initialized");
        Ok(Self { client })
    }

    pub fn client(&self) -> &WahaClient {
        &self.client
    }
}

#[async_trait]
impl PluginAdapter for WahaChannel {
    fn name(&self) -> &str {
        "waha"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, BolsoError> {
        match self.client.session_status().await {
            Ok(info) if info.is_working() => Ok(HealthStatus::Healthy),
            Ok(info) => Ok(HealthStatus::Degraded(format!("session status {}", info.status))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), BolsoError> {
        debug!("WAHA channel shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for WahaChannel {
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, BolsoError> {
        let id = self.client.send_text(&msg.chat_id, &msg.text).await?;
        Ok(MessageId(id.unwrap_or_default()))
    }
}

#[async_trait]
impl MediaFetcher for WahaChannel {
    async fn fetch_media(&self, url: &str) -> Result<MediaPayload, BolsoError> {
        self.client.download_media(url).await
    }
}
