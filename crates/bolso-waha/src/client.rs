// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WAHA REST API.

use std::time::Duration;

use bolso_core::BolsoError;
use bolso_core::types::MediaPayload;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{SendTextRequest, SessionInfo, sent_message_id};

/// Resolve a media reference from a webhook against the WAHA base URL.
///
/// Absolute `http(s)` references are returned unchanged.
pub fn resolve_media_url(base_url: &str, reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if reference.starts_with('/') {
        format!("{base}{reference}")
    } else {
        format!("{base}/{reference}")
    }
}

/// Thin client over the WAHA endpoints the relay uses.
#[derive(Debug, Clone)]
pub struct WahaClient {
    client: reqwest::Client,
    base_url: String,
    session: String,
}

impl WahaClient {
    pub fn new(
        base_url: &str,
        session: String,
        api_key: Option<&str>,
    ) -> Result<Self, BolsoError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(
                "X-Api-Key",
                HeaderValue::from_str(key).map_err(|e| {
                    BolsoError::Config(format!("invalid WAHA API key header value: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BolsoError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    /// `POST /api/sendText`. Returns the platform message id when WAHA reports one.
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<Option<String>, BolsoError> {
        let url = format!("{}/api/sendText", self.base_url);
        let body = SendTextRequest {
            session: &self.session,
            chat_id,
            text,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BolsoError::Channel {
                message: format!("sendText request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BolsoError::Channel {
                message: format!("failed to send message: {status} - {body}"),
                source: None,
            });
        }

        let value: serde_json::Value = response.json().await.unwrap_or_default();
        let id = sent_message_id(&value);
        debug!(chat_id, message_id = ?id, "message sent via WAHA");
        Ok(id)
    }

    /// Download a media reference (absolute or WAHA-relative).
    pub async fn download_media(&self, reference: &str) -> Result<MediaPayload, BolsoError> {
        let url = resolve_media_url(&self.base_url, reference);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BolsoError::Media {
                message: format!("media request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BolsoError::Media {
                message: format!("failed to download media: {status}"),
                source: None,
            });
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await.map_err(|e| BolsoError::Media {
            message: format!("failed to read media body: {e}"),
            source: Some(Box::new(e)),
        })?;

        debug!(url = %url, size = bytes.len(), mime_type = %mime_type, "downloaded media");
        Ok(MediaPayload {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }

    /// `GET /api/sessions/{session}`.
    pub async fn session_status(&self) -> Result<SessionInfo, BolsoError> {
        let url = format!("{}/api/sessions/{}", self.base_url, self.session);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BolsoError::Channel {
                message: format!("session status request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BolsoError::Channel {
                message: format!("failed to get session status: {status}"),
                source: None,
            });
        }

        response.json().await.map_err(|e| BolsoError::Channel {
            message: format!("unexpected session status body: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
