//! Prometheus wiring for the gateway.
//!
//! Handlers and the upload pipeline record through the `metrics` facade;
//! the exporter is only installed by [`install_recorder`], so calls made
//! without it (tests, library use) are no-ops.

use std::time::Duration;

use docgate::{AuthError, PipelineMetrics, ProviderError, StorageError};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const UPLOADS_TOTAL: &str = "docgate_uploads_total";
pub const UPLOAD_DURATION_SECONDS: &str = "docgate_upload_duration_seconds";
pub const PROVIDER_CALLS_TOTAL: &str = "docgate_provider_calls_total";
pub const PROVIDER_CALL_SECONDS: &str = "docgate_provider_call_seconds";
pub const TOKEN_VERIFICATIONS_TOTAL: &str = "docgate_token_verifications_total";
pub const STORE_SECONDS: &str = "docgate_store_seconds";
pub const PAYMENTS_TOTAL: &str = "docgate_payments_total";

/// Install the global Prometheus recorder.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}

/// Record the end of one `/upload_document` request.
pub fn record_upload(outcome: &'static str, elapsed: Duration) {
    counter!(UPLOADS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(UPLOAD_DURATION_SECONDS).record(elapsed.as_secs_f64());
}

pub fn record_payment() {
    counter!(PAYMENTS_TOTAL).increment(1);
}

/// [`PipelineMetrics`] backed by the `metrics` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeMetrics;

impl PipelineMetrics for FacadeMetrics {
    fn record_verify(&self, _latency: Duration, result: Result<(), &AuthError>) {
        counter!(TOKEN_VERIFICATIONS_TOTAL, "outcome" => outcome(&result)).increment(1);
    }

    fn record_store(&self, latency: Duration, _result: Result<(), &StorageError>) {
        histogram!(STORE_SECONDS).record(latency.as_secs_f64());
    }

    fn record_provider(
        &self,
        provider: &str,
        latency: Duration,
        result: Result<(), &ProviderError>,
    ) {
        let outcome = match result {
            Ok(()) => "ok",
            Err(err) => err.kind(),
        };
        counter!(
            PROVIDER_CALLS_TOTAL,
            "provider" => provider.to_string(),
            "outcome" => outcome
        )
        .increment(1);
        histogram!(PROVIDER_CALL_SECONDS, "provider" => provider.to_string())
            .record(latency.as_secs_f64());
    }
}

fn outcome<E>(result: &Result<(), E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "rejected"
    }
}
