// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns an inbound event into text and/or media the extractor can use.

use std::sync::Arc;

use bolso_core::BolsoError;
use bolso_core::MediaFetcher;
use bolso_core::types::{ContentKind, InboundEvent, MediaPayload};
use tracing::debug;

/// Content handed to the extraction step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedContent {
    pub text: Option<String>,
    pub media: Option<MediaPayload>,
}

/// Result of normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Content(NormalizedContent),
    /// Content kind the pipeline cannot process.
    Unsupported,
}

pub struct ContentNormalizer {
    media: Arc<dyn MediaFetcher>,
}

impl ContentNormalizer {
    pub fn new(media: Arc<dyn MediaFetcher>) -> Self {
        Self { media }
    }

    /// Normalize `event`. Media download failures are returned as errors.
    pub async fn normalize(&self, event: &InboundEvent) -> Result<Normalized, BolsoError> {
        match event.content_kind {
            ContentKind::Text => match event.body.as_deref() {
                Some(body) if !body.is_empty() => Ok(Normalized::Content(NormalizedContent {
                    text: Some(body.to_string()),
                    media: None,
                })),
                _ => Ok(Normalized::Unsupported),
            },
            ContentKind::Voice | ContentKind::Image => {
                let Some(reference) = event.media_url.as_deref().filter(|_| event.has_media)
                else {
                    return Ok(Normalized::Unsupported);
                };
                let media = self.media.fetch_media(reference).await?;
                debug!(
                    kind = %event.content_kind,
                    mime_type = %media.mime_type,
                    size = media.bytes.len(),
                    "media fetched"
                );
                Ok(Normalized::Content(NormalizedContent {
                    text: None,
                    media: Some(media),
                }))
            }
            ContentKind::Other => Ok(Normalized::Unsupported),
        }
    }
}
