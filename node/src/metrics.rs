//! Prometheus metrics for the kycgate node.
//!
//! [`KycMetrics`] owns a dedicated [`Registry`] that the `/metrics` endpoint
//! encodes into the Prometheus text exposition format.

use kycgate_verification::{ReconcileOutcome, ReconcileSource};
use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts,
    Registry,
};

pub struct KycMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Reconciliations by `source` (poll, webhook) and `outcome` code.
    pub reconciliations: IntCounterVec,
    /// Provider sessions opened.
    pub sessions_created: IntCounter,
    /// Webhooks refused for a missing or wrong signature.
    pub webhook_auth_failures: IntCounter,
    /// Failed provider calls by `operation`.
    pub provider_errors: IntCounterVec,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Round-trip time of provider calls, in seconds.
    pub provider_latency_seconds: Histogram,
}

impl KycMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let reconciliations = register_int_counter_vec_with_registry!(
            Opts::new(
                "kycgate_reconciliations_total",
                "Verification verdicts reconciled, by source and outcome"
            ),
            &["source", "outcome"],
            registry
        )?;

        let sessions_created = register_int_counter_with_registry!(
            Opts::new(
                "kycgate_sessions_created_total",
                "Verification sessions opened with the provider"
            ),
            registry
        )?;

        let webhook_auth_failures = register_int_counter_with_registry!(
            Opts::new(
                "kycgate_webhook_auth_failures_total",
                "Inbound webhooks rejected for a missing or invalid signature"
            ),
            registry
        )?;

        let provider_errors = register_int_counter_vec_with_registry!(
            Opts::new(
                "kycgate_provider_errors_total",
                "Failed calls to the verification provider, by operation"
            ),
            &["operation"],
            registry
        )?;

        let provider_latency_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "kycgate_provider_latency_seconds",
                "Round-trip time of verification provider calls"
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0]),
            registry
        )?;

        Ok(Self {
            registry,
            reconciliations,
            sessions_created,
            webhook_auth_failures,
            provider_errors,
            provider_latency_seconds,
        })
    }

    pub fn record_outcome(&self, source: ReconcileSource, outcome: &ReconcileOutcome) {
        let label = outcome.code.map(|c| c.as_str()).unwrap_or("verified");
        self.reconciliations
            .with_label_values(&[source.as_str(), label])
            .inc();
    }
}
