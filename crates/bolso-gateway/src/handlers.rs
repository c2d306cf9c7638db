// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers for the gateway routes.

use std::collections::BTreeMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bolso_core::HealthStatus;
use bolso_waha::WahaWebhook;
use serde::Serialize;
use serde_json::json;

use crate::server::GatewayState;

/// Health of one collaborator.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<HealthStatus> for ComponentHealth {
    fn from(status: HealthStatus) -> Self {
        let label = status.label();
        let detail = match status {
            HealthStatus::Healthy => None,
            HealthStatus::Degraded(d) | HealthStatus::Unhealthy(d) => Some(d),
        };
        Self {
            status: label,
            detail,
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every component is healthy, else `degraded`.
    pub status: &'static str,
    pub timestamp: String,
    pub components: BTreeMap<&'static str, ComponentHealth>,
}

/// POST /webhook
///
/// Answers with the dispatcher's acknowledgement. Only a body that cannot
/// be decoded at all gets the 500 reply.
pub async fn post_webhook(State(state): State<GatewayState>, body: Bytes) -> Response {
    let webhook: WahaWebhook = match serde_json::from_slice(&body) {
        Ok(webhook) => webhook,
        Err(e) => {
            tracing::error!(error = %e, "undecodable webhook body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response();
        }
    };

    let ack = state.dispatcher.handle(webhook.into_event()).await;
    let status =
        StatusCode::from_u16(ack.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ack.body())).into_response()
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let storage = component(state.health.storage.health_check().await);
    let whatsapp = component(state.health.channel.health_check().await);

    let all_healthy = storage.status == "healthy" && whatsapp.status == "healthy";
    let mut components = BTreeMap::new();
    components.insert("storage", storage);
    components.insert("whatsapp", whatsapp);

    Json(HealthResponse {
        status: if all_healthy { "ok" } else { "degraded" },
        timestamp: chrono::Utc::now().to_rfc3339(),
        components,
    })
}

fn component(result: Result<HealthStatus, bolso_core::BolsoError>) -> ComponentHealth {
    result
        .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()))
        .into()
}

/// GET /metrics
///
/// Prometheus text exposition, or 404 when no recorder is installed.
pub async fn get_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
