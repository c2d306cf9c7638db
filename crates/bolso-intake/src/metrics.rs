// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; the binary installs the Prometheus recorder.
//! Without a recorder every call is a no-op.

use metrics::{describe_counter, describe_histogram};

/// Register all intake metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "bolso_webhook_events_total",
        "Webhook events handled, by terminal outcome"
    );
    describe_counter!(
        "bolso_transactions_total",
        "Transaction inserts, by result (stored/failed)"
    );
    describe_counter!(
        "bolso_quota_fail_open_total",
        "Messages admitted because the usage store was unreachable"
    );
    describe_counter!(
        "bolso_extraction_failures_total",
        "Extraction calls that degraded to an empty result, by reason"
    );
    describe_counter!("bolso_replies_failed_total", "Replies the transport failed to send");
    describe_histogram!(
        "bolso_extraction_confidence",
        "Confidence reported by the extraction model"
    );
}

/// Record the terminal outcome of one webhook event.
pub fn record_outcome(outcome: &'static str) {
    metrics::counter!("bolso_webhook_events_total", "outcome" => outcome).increment(1);
}

/// Record stored and failed transaction inserts for one batch.
pub fn record_transactions(stored: usize, failed: usize) {
    metrics::counter!("bolso_transactions_total", "result" => "stored").increment(stored as u64);
    metrics::counter!("bolso_transactions_total", "result" => "failed").increment(failed as u64);
}

pub fn record_quota_fail_open() {
    metrics::counter!("bolso_quota_fail_open_total").increment(1);
}

pub fn record_extraction_failure(reason: &'static str) {
    metrics::counter!("bolso_extraction_failures_total", "reason" => reason).increment(1);
}

pub fn record_confidence(confidence: f64) {
    metrics::histogram!("bolso_extraction_confidence").record(confidence);
}

pub fn record_reply_failure() {
    metrics::counter!("bolso_replies_failed_total").increment(1);
}
