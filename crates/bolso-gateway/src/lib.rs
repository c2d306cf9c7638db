// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the bolso relay.
//!
//! Receives WAHA webhook calls and hands each event to the intake
//! [`Dispatcher`](bolso_intake::Dispatcher). Also serves `/health` with
//! collaborator status and `/metrics` when a Prometheus recorder is present.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, HealthState, ServerConfig, build_router, start_server};
