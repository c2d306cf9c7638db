// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! Adapters extend the [`PluginAdapter`] base trait and use `#[async_trait]`
//! so they can be held as `Arc<dyn Trait>`.

pub mod adapter;
pub mod channel;
pub mod media;
pub mod provider;
pub mod storage;

pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use media::MediaFetcher;
pub use provider::ProviderAdapter;
pub use storage::StorageAdapter;
