// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dispatcher scenarios against mock collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use bolso_config::BolsoConfig;
use bolso_core::types::{
    AccountLink, AdapterType, ContentKind, EventKind, HealthStatus, InboundEvent, ProviderRequest,
    ProviderResponse,
};
use bolso_core::{BolsoError, PluginAdapter, ProviderAdapter};
use bolso_intake::{Acknowledgement, DispatchOutcome, Dispatcher, ReferenceClock};
use bolso_test_utils::{MockChannel, MockProvider, MockStorage};
use chrono::{Duration, Utc};

const LID: &str = "226744275624053@lid";

struct Harness {
    channel: Arc<MockChannel>,
    provider: Arc<MockProvider>,
    storage: Arc<MockStorage>,
    dispatcher: Dispatcher,
}

fn harness() -> Harness {
    let channel = Arc::new(MockChannel::new());
    let provider = Arc::new(MockProvider::new());
    let storage = Arc::new(MockStorage::new());
    let dispatcher = Dispatcher::new(
        channel.clone(),
        channel.clone(),
        provider.clone(),
        storage.clone(),
        &BolsoConfig::default(),
    )
    .unwrap();
    Harness {
        channel,
        provider,
        storage,
        dispatcher,
    }
}

fn text(sender: &str, body: &str) -> InboundEvent {
    InboundEvent {
        id: Some("wamid.1".into()),
        kind: EventKind::Message,
        from_me: false,
        sender: sender.into(),
        body: Some(body.into()),
        content_kind: ContentKind::Text,
        has_media: false,
        media_url: None,
        timestamp: 1_760_000_000,
    }
}

fn media(sender: &str, kind: ContentKind, url: &str) -> InboundEvent {
    InboundEvent {
        body: None,
        content_kind: kind,
        has_media: true,
        media_url: Some(url.into()),
        ..text(sender, "")
    }
}

fn current_period() -> String {
    ReferenceClock::from_offset_minutes(-180)
        .unwrap()
        .period_key(Utc::now())
}

fn pending_link(code: &str) -> AccountLink {
    AccountLink {
        id: "link-1".into(),
        account_id: "acct-1".into(),
        phone_number: "5511999999999".into(),
        linked_id: None,
        verification_code: Some(code.into()),
        verification_expires_at: Some(Utc::now() + Duration::minutes(10)),
        linked_at: None,
    }
}

#[tokio::test]
async fn single_expense_is_confirmed() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    h.provider
        .add_response(r#"{"transactions": [{"description": "Uber", "amount": 50, "type": "expense", "category": "variable_transport"}], "confidence": 0.95}"#)
        .await;

    let ack = h.dispatcher.handle(text(LID, "gastei 50 no uber")).await;

    assert_eq!(ack, Acknowledgement::Handled(DispatchOutcome::Processed { stored: 1 }));
    assert_eq!(h.channel.single_reply().await, "✅ Transação registrada!\n\n💸 Uber: R$ 50,00");
    let stored = h.storage.transactions().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].account_id, "acct-1");
    assert_eq!(h.channel.sent_messages().await[0].chat_id, LID);
}

#[tokio::test]
async fn two_bills_in_one_message() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    h.provider
        .add_response(r#"{"transactions": [{"description": "Conta de luz", "amount": 150, "type": "expense", "category": "fixed_utilities"}, {"description": "Internet", "amount": 80, "type": "expense", "category": "fixed_utilities"}], "confidence": 0.92}"#)
        .await;

    let ack = h
        .dispatcher
        .handle(text(LID, "paguei 150 de luz e 80 de internet"))
        .await;

    assert_eq!(ack.body()["stored"], 2);
    assert_eq!(
        h.channel.single_reply().await,
        "✅ 2 transações registradas!\n\n💸 Conta de luz: R$ 150,00\n💸 Internet: R$ 80,00"
    );
}

#[tokio::test]
async fn unknown_code_is_rejected() {
    let h = harness();
    let ack = h.dispatcher.handle(text(LID, "ABC123")).await;

    assert_eq!(ack, Acknowledgement::Handled(DispatchOutcome::VerificationFailed));
    assert!(h.channel.single_reply().await.contains("inválido ou expirado"));
    assert_eq!(h.provider.call_count().await, 0);
}

#[tokio::test]
async fn code_links_sender_once() {
    let h = harness();
    h.storage.add_link(pending_link("ABC123")).await;

    let first = h.dispatcher.handle(text(LID, " abc123 ")).await;
    assert_eq!(first, Acknowledgement::Handled(DispatchOutcome::Verified));
    assert!(h.channel.single_reply().await.contains("vinculado com sucesso"));

    let links = h.storage.links().await;
    assert_eq!(links[0].linked_id.as_deref(), Some("226744275624053"));
    assert!(links[0].verification_code.is_none());

    // Replayed from another sender: the code is spent.
    let replay = h.dispatcher.handle(text("999@lid", "ABC123")).await;
    assert_eq!(replay, Acknowledgement::Handled(DispatchOutcome::VerificationFailed));
    assert_eq!(
        h.storage.links().await[0].linked_id.as_deref(),
        Some("226744275624053")
    );
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let h = harness();
    let mut link = pending_link("ABC123");
    link.verification_expires_at = Some(Utc::now() - Duration::minutes(1));
    h.storage.add_link(link).await;

    let ack = h.dispatcher.handle(text(LID, "ABC123")).await;
    assert_eq!(ack, Acknowledgement::Handled(DispatchOutcome::VerificationFailed));
}

#[tokio::test]
async fn unregistered_senders_get_onboarding() {
    let h = harness();
    let ack = h.dispatcher.handle(text(LID, "oi, tudo bem?")).await;
    assert_eq!(ack.body()["message"], "User not registered");
    assert!(h.channel.single_reply().await.contains("Se já tem um código"));

    let h = harness();
    h.dispatcher
        .handle(media(LID, ContentKind::Voice, "/api/files/a.oga"))
        .await;
    assert!(h.channel.single_reply().await.starts_with("👋 Para usar"));
    assert!(h.channel.fetched_urls().await.is_empty());
}

#[tokio::test]
async fn warning_when_quota_nearly_spent() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    // This message brings usage to 29/30.
    h.storage.set_usage("acct-1", &current_period(), 28, 30).await;
    h.provider
        .add_response(r#"{"transactions": [{"description": "Uber", "amount": 50, "type": "expense"}]}"#)
        .await;

    h.dispatcher.handle(text(LID, "gastei 50 no uber")).await;

    let reply = h.channel.single_reply().await;
    assert!(reply.starts_with("✅ Transação registrada!"));
    assert!(reply.contains("1 mensagem restante"));
    assert!(reply.contains("https://meubolso.app/planos"));
}

#[tokio::test]
async fn limit_reached_stops_before_extraction() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    h.storage.set_usage("acct-1", &current_period(), 30, 30).await;

    let ack = h.dispatcher.handle(text(LID, "gastei 50 no uber")).await;

    assert_eq!(ack, Acknowledgement::Handled(DispatchOutcome::LimitReached));
    assert!(h.channel.single_reply().await.contains("limite de 30 mensagens"));
    assert_eq!(h.provider.call_count().await, 0);
    assert_eq!(h.storage.usage("acct-1").await.unwrap().used, 30);
}

#[tokio::test]
async fn replay_cannot_exceed_limit() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    h.storage.set_usage("acct-1", &current_period(), 29, 30).await;

    let event = text(LID, "gastei 50 no uber");
    h.dispatcher.handle(event.clone()).await;
    let second = h.dispatcher.handle(event).await;

    assert_eq!(second, Acknowledgement::Handled(DispatchOutcome::LimitReached));
    assert_eq!(h.storage.usage("acct-1").await.unwrap().used, 30);
}

#[tokio::test]
async fn unrecognized_sender_is_silent() {
    let h = harness();
    let ack = h.dispatcher.handle(text("120363@g.us", "gastei 50")).await;

    assert_eq!(ack.body()["message"], "Could not extract LID");
    assert_eq!(h.channel.sent_count().await, 0);
}

#[tokio::test]
async fn own_messages_and_other_events_are_filtered() {
    let h = harness();
    let mut own = text(LID, "gastei 50");
    own.from_me = true;
    assert_eq!(
        h.dispatcher.handle(own).await,
        Acknowledgement::Handled(DispatchOutcome::Filtered)
    );

    let mut ack_event = text(LID, "gastei 50");
    ack_event.kind = EventKind::Other("message.ack".into());
    assert_eq!(
        h.dispatcher.handle(ack_event).await,
        Acknowledgement::Handled(DispatchOutcome::Filtered)
    );
    assert_eq!(h.channel.sent_count().await, 0);
}

#[tokio::test]
async fn unsupported_content_gets_capability_message() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    let mut sticker = media(LID, ContentKind::Other, "/api/files/s.webp");
    sticker.has_media = true;

    let ack = h.dispatcher.handle(sticker).await;

    assert_eq!(ack.body(), serde_json::json!({ "ok": true }));
    assert!(h.channel.single_reply().await.contains("texto, áudio ou imagem"));
}

#[tokio::test]
async fn voice_note_is_sent_to_provider() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    h.channel
        .add_media("/api/files/a.oga", vec![0x4f, 0x67, 0x67], "audio/ogg")
        .await;
    h.provider
        .add_response(r#"{"transactions": [{"description": "Mercado", "amount": 1234.5, "type": "expense"}], "confidence": 0.8}"#)
        .await;

    h.dispatcher
        .handle(media(LID, ContentKind::Voice, "/api/files/a.oga"))
        .await;

    assert_eq!(h.channel.single_reply().await, "✅ Transação registrada!\n\n💸 Mercado: R$ 1.234,50");
    assert_eq!(h.provider.requests().await[0].parts.len(), 3);
}

#[tokio::test]
async fn media_failure_is_a_server_error() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;

    let ack = h
        .dispatcher
        .handle(media(LID, ContentKind::Image, "/api/files/missing.jpg"))
        .await;

    assert_eq!(ack, Acknowledgement::ServerError);
    assert_eq!(ack.status_code(), 500);
    assert_eq!(h.channel.sent_count().await, 0);
}

#[tokio::test]
async fn nothing_extracted_reply() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    h.provider.add_response("Não entendi.").await;

    let ack = h.dispatcher.handle(text(LID, "bom dia")).await;

    assert_eq!(ack, Acknowledgement::Handled(DispatchOutcome::NothingExtracted));
    assert!(h.channel.single_reply().await.starts_with("Não consegui identificar"));
}

#[tokio::test]
async fn failed_inserts_get_apology() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    h.storage.fail_inserts(true);
    h.provider
        .add_response(r#"{"transactions": [{"description": "Uber", "amount": 50, "type": "expense"}]}"#)
        .await;

    let ack = h.dispatcher.handle(text(LID, "gastei 50 no uber")).await;

    assert_eq!(ack, Acknowledgement::Handled(DispatchOutcome::PersistenceFailed));
    assert!(h.channel.single_reply().await.contains("Não consegui salvar"));
}

#[tokio::test]
async fn reply_failure_does_not_change_outcome() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    h.channel.fail_sends(true);
    h.provider
        .add_response(r#"{"transactions": [{"description": "Uber", "amount": 50, "type": "expense"}]}"#)
        .await;

    let ack = h.dispatcher.handle(text(LID, "gastei 50 no uber")).await;
    assert_eq!(ack, Acknowledgement::Handled(DispatchOutcome::Processed { stored: 1 }));
    assert_eq!(h.channel.sent_count().await, 1);
}

#[tokio::test]
async fn quota_store_outage_fails_open() {
    let h = harness();
    h.storage.add_linked("acct-1", "226744275624053").await;
    h.storage.fail_usage(true);
    h.provider
        .add_response(r#"{"transactions": [{"description": "Uber", "amount": 50, "type": "expense"}]}"#)
        .await;

    let ack = h.dispatcher.handle(text(LID, "gastei 50 no uber")).await;
    assert_eq!(ack, Acknowledgement::Handled(DispatchOutcome::Processed { stored: 1 }));
    assert!(!h.channel.single_reply().await.contains("restante"));
}

#[tokio::test]
async fn lookup_failure_is_a_server_error() {
    let h = harness();
    h.storage.fail_lookups(true);
    let ack = h.dispatcher.handle(text(LID, "gastei 50")).await;
    assert_eq!(ack, Acknowledgement::ServerError);
}

#[tokio::test]
async fn legacy_phone_sender_resolves() {
    let h = harness();
    let mut link = pending_link("ZZZ999");
    link.verification_code = None;
    link.verification_expires_at = None;
    h.storage.add_link(link).await;
    h.provider
        .add_response(r#"{"transactions": [{"description": "Salário", "amount": 5000, "type": "income"}]}"#)
        .await;

    // Stored with the country code, sent without it.
    h.dispatcher
        .handle(text("11999999999@c.us", "recebi 5000 de salário"))
        .await;

    assert_eq!(h.channel.single_reply().await, "✅ Transação registrada!\n\n💰 Salário: R$ 5.000,00");
    assert_eq!(h.storage.transactions().await[0].account_id, "acct-1");
}

struct PanickingProvider;

#[async_trait]
impl PluginAdapter for PanickingProvider {
    fn name(&self) -> &str {
        "panicking"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 0, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, BolsoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BolsoError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for PanickingProvider {
    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, BolsoError> {
        panic!("provider blew up");
    }
}

#[tokio::test]
async fn panic_is_caught_at_boundary() {
    let channel = Arc::new(MockChannel::new());
    let storage = Arc::new(MockStorage::new());
    storage.add_linked("acct-1", "226744275624053").await;
    let dispatcher = Dispatcher::new(
        channel.clone(),
        channel.clone(),
        Arc::new(PanickingProvider),
        storage,
        &BolsoConfig::default(),
    )
    .unwrap();

    let ack = dispatcher.handle(text(LID, "gastei 50")).await;
    assert_eq!(ack, Acknowledgement::ServerError);
    assert_eq!(channel.sent_count().await, 0);
}
