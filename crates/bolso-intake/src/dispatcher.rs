// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-event state machine from raw webhook event to reply.
//!
//! ```text
//! Filtered | SenderUnrecognized                      (silent)
//! unresolved sender -> Verified | VerificationFailed | Onboarding
//! resolved sender   -> LimitReached | Unsupported
//!                   -> NothingExtracted | Processed | PersistenceFailed
//! ```
//!
//! Every non-silent terminal state sends exactly one reply to the raw sender
//! id. Reply failures are logged and never change the outcome.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bolso_config::BolsoConfig;
use bolso_core::types::{ContentKind, EventKind, InboundEvent, OutboundMessage};
use bolso_core::{BolsoError, ChannelAdapter, MediaFetcher, ProviderAdapter, StorageAdapter};
use futures::FutureExt;
use serde_json::{Value, json};
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::clock::ReferenceClock;
use crate::commit::{TransactionCommitter, WarningPolicy};
use crate::extraction::Extractor;
use crate::identity::{IdentityResolver, SenderId, verification_code};
use crate::metrics;
use crate::normalize::{ContentNormalizer, Normalized};
use crate::quota::QuotaGate;
use crate::replies;

/// Terminal state reached by one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a message, or sent by the connected account.
    Filtered,
    /// Sender id has no recognized scheme.
    SenderUnrecognized,
    Verified,
    VerificationFailed,
    /// Unregistered sender without a code.
    Onboarding,
    LimitReached,
    Unsupported,
    NothingExtracted,
    Processed { stored: usize },
    /// Candidates existed but none could be stored.
    PersistenceFailed,
}

impl DispatchOutcome {
    /// Metric and log label.
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Filtered => "filtered",
            DispatchOutcome::SenderUnrecognized => "sender_unrecognized",
            DispatchOutcome::Verified => "verified",
            DispatchOutcome::VerificationFailed => "verification_failed",
            DispatchOutcome::Onboarding => "onboarding",
            DispatchOutcome::LimitReached => "limit_reached",
            DispatchOutcome::Unsupported => "unsupported",
            DispatchOutcome::NothingExtracted => "nothing_extracted",
            DispatchOutcome::Processed { .. } => "processed",
            DispatchOutcome::PersistenceFailed => "persistence_failed",
        }
    }
}

/// Webhook acknowledgement returned to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    Handled(DispatchOutcome),
    /// An error or panic escaped the pipeline.
    ServerError,
}

impl Acknowledgement {
    pub fn status_code(&self) -> u16 {
        match self {
            Acknowledgement::Handled(_) => 200,
            Acknowledgement::ServerError => 500,
        }
    }

    pub fn body(&self) -> Value {
        let outcome = match self {
            Acknowledgement::Handled(outcome) => outcome,
            Acknowledgement::ServerError => return json!({ "error": "Internal server error" }),
        };
        match outcome {
            DispatchOutcome::Filtered | DispatchOutcome::Unsupported => json!({ "ok": true }),
            DispatchOutcome::SenderUnrecognized => {
                json!({ "ok": true, "message": "Could not extract LID" })
            }
            DispatchOutcome::Verified => json!({ "ok": true, "verified": true }),
            DispatchOutcome::VerificationFailed => {
                json!({ "ok": true, "message": "Invalid verification code" })
            }
            DispatchOutcome::Onboarding => json!({ "ok": true, "message": "User not registered" }),
            DispatchOutcome::LimitReached => {
                json!({ "ok": true, "message": "Monthly limit reached" })
            }
            DispatchOutcome::NothingExtracted | DispatchOutcome::PersistenceFailed => {
                json!({ "ok": true, "processed": true, "stored": 0 })
            }
            DispatchOutcome::Processed { stored } => {
                json!({ "ok": true, "processed": true, "stored": stored })
            }
        }
    }
}

/// Runs inbound events through identity, quota, extraction and commit.
pub struct Dispatcher {
    channel: Arc<dyn ChannelAdapter>,
    clock: ReferenceClock,
    identity: IdentityResolver,
    quota: QuotaGate,
    normalizer: ContentNormalizer,
    extractor: Extractor,
    committer: TransactionCommitter,
    upgrade_url: String,
}

impl Dispatcher {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        media: Arc<dyn MediaFetcher>,
        provider: Arc<dyn ProviderAdapter>,
        storage: Arc<dyn StorageAdapter>,
        config: &BolsoConfig,
    ) -> Result<Self, BolsoError> {
        let clock = ReferenceClock::from_offset_minutes(config.locale.utc_offset_minutes)?;
        Ok(Self {
            channel,
            clock,
            identity: IdentityResolver::new(storage.clone(), config.locale.country_code.clone()),
            quota: QuotaGate::new(storage.clone(), clock, config.quota.default_monthly_limit),
            normalizer: ContentNormalizer::new(media),
            extractor: Extractor::new(provider),
            committer: TransactionCommitter::new(
                storage,
                clock,
                WarningPolicy::from(&config.quota),
            ),
            upgrade_url: config.quota.upgrade_url.clone(),
        })
    }

    /// Handle one event, catching every error and panic.
    pub async fn handle(&self, event: InboundEvent) -> Acknowledgement {
        let span = info_span!(
            "webhook",
            message_id = event.id.as_deref().unwrap_or(""),
            kind = %event.content_kind,
        );
        let result = AssertUnwindSafe(self.dispatch(&event).instrument(span))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(outcome)) => {
                metrics::record_outcome(outcome.label());
                Acknowledgement::Handled(outcome)
            }
            Ok(Err(e)) => {
                error!(error = %e, "webhook processing failed");
                metrics::record_outcome("error");
                Acknowledgement::ServerError
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(panic = %message, "webhook processing panicked");
                metrics::record_outcome("error");
                Acknowledgement::ServerError
            }
        }
    }

    /// Drive `event` to a terminal state. Errors propagate to [`handle`](Self::handle).
    pub async fn dispatch(&self, event: &InboundEvent) -> Result<DispatchOutcome, BolsoError> {
        if event.kind != EventKind::Message || event.from_me {
            return Ok(DispatchOutcome::Filtered);
        }

        let Some(sender) = SenderId::parse(&event.sender) else {
            info!(sender = %event.sender, "unrecognized sender id, dropping");
            return Ok(DispatchOutcome::SenderUnrecognized);
        };

        let Some(link) = self.identity.resolve(&sender).await? else {
            return self.handle_unregistered(event, &sender).await;
        };
        debug!(account_id = %link.account_id, "sender resolved");

        let usage = self.quota.check_and_increment(&link.account_id).await;
        if !usage.allowed {
            info!(account_id = %link.account_id, used = usage.used, limit = usage.limit, "monthly limit reached");
            self.reply(event, replies::limit_reached(usage.limit, &self.upgrade_url))
                .await;
            return Ok(DispatchOutcome::LimitReached);
        }

        let content = match self.normalizer.normalize(event).await? {
            Normalized::Content(content) => content,
            Normalized::Unsupported => {
                self.reply(event, replies::UNSUPPORTED.to_string()).await;
                return Ok(DispatchOutcome::Unsupported);
            }
        };

        let extraction = self
            .extractor
            .extract(content.text.as_deref(), content.media.as_ref())
            .await;
        if extraction.transactions.is_empty() {
            self.reply(event, replies::NOTHING_EXTRACTED.to_string()).await;
            return Ok(DispatchOutcome::NothingExtracted);
        }

        let report = self
            .committer
            .commit(&link.account_id, &extraction.transactions, &usage)
            .await;
        match report.reply {
            Some(text) => {
                self.reply(event, text).await;
                Ok(DispatchOutcome::Processed {
                    stored: report.stored,
                })
            }
            None => {
                self.reply(event, replies::PERSISTENCE_FAILED.to_string()).await;
                Ok(DispatchOutcome::PersistenceFailed)
            }
        }
    }

    async fn handle_unregistered(
        &self,
        event: &InboundEvent,
        sender: &SenderId,
    ) -> Result<DispatchOutcome, BolsoError> {
        let body = event
            .body
            .as_deref()
            .filter(|b| event.content_kind == ContentKind::Text && !b.is_empty());

        let Some(body) = body else {
            self.reply(event, replies::ONBOARDING_MEDIA.to_string()).await;
            return Ok(DispatchOutcome::Onboarding);
        };

        let Some(code) = verification_code(body) else {
            self.reply(event, replies::ONBOARDING_TEXT.to_string()).await;
            return Ok(DispatchOutcome::Onboarding);
        };

        match self.identity.verify(&code, sender, self.clock.now()).await? {
            Some(link) => {
                info!(account_id = %link.account_id, "sender linked");
                self.reply(event, replies::WELCOME.to_string()).await;
                Ok(DispatchOutcome::Verified)
            }
            None => {
                info!("verification code rejected");
                self.reply(event, replies::INVALID_CODE.to_string()).await;
                Ok(DispatchOutcome::VerificationFailed)
            }
        }
    }

    async fn reply(&self, event: &InboundEvent, text: String) {
        let msg = OutboundMessage {
            chat_id: event.sender.clone(),
            text,
        };
        if let Err(e) = self.channel.send(msg).await {
            warn!(chat_id = %event.sender, error = %e, "failed to send reply");
            metrics::record_reply_failure();
        }
    }
}
