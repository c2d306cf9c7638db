// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockChannel` implements both `ChannelAdapter` and `MediaFetcher`: sent
//! messages are captured for assertions and media downloads are served from
//! a map of URL to payload.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use bolso_core::BolsoError;
use bolso_core::traits::adapter::PluginAdapter;
use bolso_core::traits::channel::ChannelAdapter;
use bolso_core::traits::media::MediaFetcher;
use bolso_core::types::{AdapterType, HealthStatus, MediaPayload, MessageId, OutboundMessage};

/// A mock messaging transport.
pub struct MockChannel {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    media: Arc<Mutex<HashMap<String, MediaPayload>>>,
    fetched: Arc<Mutex<Vec<String>>>,
    fail_sends: AtomicBool,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            media: Arc::new(Mutex::new(HashMap::new())),
            fetched: Arc::new(Mutex::new(Vec::new())),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// Serve `bytes` with `mime_type` when `url` is fetched.
    pub async fn add_media(&self, url: &str, bytes: Vec<u8>, mime_type: &str) {
        self.media.lock().await.insert(
            url.to_string(),
            MediaPayload {
                bytes,
                mime_type: mime_type.to_string(),
            },
        );
    }

    /// Make every subsequent `send()` fail (messages are still captured).
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// All messages passed to `send()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Text of the only sent message. Panics unless exactly one was sent.
    pub async fn single_reply(&self) -> String {
        let sent = self.sent.lock().await;
        assert_eq!(sent.len(), 1, "expected exactly one reply, got {sent:?}");
        sent[0].text.clone()
    }

    /// URLs requested through `fetch_media()`.
    pub async fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().await.clone()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, BolsoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BolsoError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, BolsoError> {
        self.sent.lock().await.push(msg);
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(BolsoError::Channel {
                message: "mock send failure".to_string(),
                source: None,
            });
        }
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }
}

#[async_trait]
impl MediaFetcher for MockChannel {
    async fn fetch_media(&self, url: &str) -> Result<MediaPayload, BolsoError> {
        self.fetched.lock().await.push(url.to_string());
        self.media
            .lock()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| BolsoError::Media {
                message: format!("download failed: 404 for {url}"),
                source: None,
            })
    }
}
