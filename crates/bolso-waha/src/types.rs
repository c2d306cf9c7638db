// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WAHA webhook payloads and REST API types.

use bolso_core::types::{ContentKind, EventKind, InboundEvent};
use serde::{Deserialize, Deserializer, Serialize};

// --- Webhook ---

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope WAHA posts to the webhook URL.
///
/// Missing or null fields default so that odd envelopes are filtered
/// downstream instead of rejected here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WahaWebhook {
    #[serde(default, deserialize_with = "null_as_default")]
    pub event: String,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: WahaPayload,
}

/// Message payload. Non-message events carry other shapes, so every field
/// is optional here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WahaPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub from_me: bool,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_media: bool,
    #[serde(default)]
    pub media_url: Option<String>,
    /// Newer WAHA engines nest the download link here.
    #[serde(default)]
    pub media: Option<WahaMedia>,
    /// `chat`, `image`, `ptt`, `audio`, `video`, `document`, ...
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WahaMedia {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
}

/// Map a WAHA message type to the relay's content kind.
pub fn content_kind(message_type: Option<&str>) -> ContentKind {
    match message_type {
        Some("chat") => ContentKind::Text,
        Some("image") => ContentKind::Image,
        Some("ptt") | Some("audio") => ContentKind::Voice,
        _ => ContentKind::Other,
    }
}

impl WahaWebhook {
    /// Build the transport-neutral event the intake pipeline consumes.
    pub fn into_event(self) -> InboundEvent {
        let p = self.payload;
        let media_url = p.media_url.or_else(|| p.media.and_then(|m| m.url));
        InboundEvent {
            id: p.id,
            kind: EventKind::from(self.event.as_str()),
            from_me: p.from_me,
            sender: p.from.unwrap_or_default(),
            body: p.body,
            content_kind: content_kind(p.message_type.as_deref()),
            has_media: p.has_media,
            media_url,
            timestamp: p.timestamp.unwrap_or_default(),
        }
    }
}

// --- REST API ---

/// Body of `POST /api/sendText`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextRequest<'a> {
    pub session: &'a str,
    pub chat_id: &'a str,
    pub text: &'a str,
}

/// Subset of `GET /api/sessions/{session}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub me: Option<SessionMe>,
}

impl SessionInfo {
    pub fn is_working(&self) -> bool {
        self.status == "WORKING"
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMe {
    pub id: String,
    #[serde(default)]
    pub push_name: Option<String>,
}

/// Pull a message id out of a `sendText` response.
///
/// WAHA returns either a plain string id or an object with `_serialized`,
/// depending on the engine.
pub fn sent_message_id(body: &serde_json::Value) -> Option<String> {
    match body.get("id")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => obj
            .get("_serialized")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        _ => None,
    }
}
