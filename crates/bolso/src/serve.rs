// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bolso serve` command implementation.
//!
//! Builds the collaborators, wires them into the intake dispatcher and runs
//! the webhook server until a shutdown signal arrives.

use std::sync::Arc;

use bolso_config::BolsoConfig;
use bolso_core::{BolsoError, HealthStatus, PluginAdapter, StorageAdapter};
use bolso_gateway::{GatewayState, HealthState, ServerConfig, start_server};
use bolso_gemini::GeminiProvider;
use bolso_intake::Dispatcher;
use bolso_storage::SqliteStorage;
use bolso_waha::WahaChannel;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

use crate::shutdown;

type RenderFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Run the webhook server.
pub async fn run_serve(config: BolsoConfig) -> Result<(), BolsoError> {
    init_tracing(&config.server.log_level);

    let prometheus_render = if config.server.metrics {
        Some(install_metrics()?)
    } else {
        None
    };

    let storage = Arc::new(SqliteStorage::new(config.storage.clone())?);
    storage.initialize().await?;
    info!(
        path = %config.storage.database_path,
        encrypted = storage.encrypts_fields(),
        "storage initialized"
    );

    let waha = Arc::new(WahaChannel::new(&config.waha)?);
    match waha.health_check().await {
        Ok(HealthStatus::Healthy) => info!(session = %config.waha.session, "WAHA session working"),
        Ok(status) => warn!(session = %config.waha.session, ?status, "WAHA session not ready"),
        Err(e) => warn!(error = %e, "WAHA unreachable at startup"),
    }

    let gemini = Arc::new(GeminiProvider::new(&config.gemini)?);

    let dispatcher = Dispatcher::new(
        waha.clone(),
        waha.clone(),
        gemini.clone(),
        storage.clone(),
        &config,
    )?;

    let state = GatewayState {
        dispatcher: Arc::new(dispatcher),
        health: HealthState {
            storage: storage.clone(),
            channel: waha.clone(),
            prometheus_render,
        },
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    start_server(&server_config, state, shutdown::signal()).await?;

    if let Err(e) = gemini.shutdown().await {
        warn!(error = %e, "provider shutdown failed");
    }
    if let Err(e) = waha.shutdown().await {
        warn!(error = %e, "channel shutdown failed");
    }
    storage.close().await?;

    info!("bolso serve shutdown complete");
    Ok(())
}

/// Install the global Prometheus recorder and describe intake metrics.
fn install_metrics() -> Result<RenderFn, BolsoError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        BolsoError::Internal(format!("failed to install Prometheus recorder: {e}"))
    })?;
    bolso_intake::metrics::register_metrics();
    info!("prometheus metrics recorder installed");
    Ok(Arc::new(move || handle.render()))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "bolso={log_level},bolso_intake={log_level},bolso_gateway={log_level},bolso_waha={log_level},bolso_gemini={log_level},bolso_storage={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
