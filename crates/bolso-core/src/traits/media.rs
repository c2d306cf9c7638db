// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media retrieval trait.

use async_trait::async_trait;

use crate::error::BolsoError;
use crate::types::MediaPayload;

/// Downloads media attached to inbound messages.
#[async_trait]
pub trait MediaFetcher: Send + Sync + 'static {
    /// Fetches the bytes and content type behind an absolute URL.
    async fn fetch_media(&self, url: &str) -> Result<MediaPayload, BolsoError>;
}
