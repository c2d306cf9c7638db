// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the outbound messaging transport.

use async_trait::async_trait;

use crate::error::BolsoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MessageId, OutboundMessage};

/// Adapter for delivering replies over the messaging transport.
///
/// From the pipeline's point of view a send is fire-and-forget: callers log
/// failures and move on.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Sends a plain-text message to a chat.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, BolsoError>;
}
