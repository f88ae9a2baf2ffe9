//! Gateway-level metrics.
//!
//! Complements [`LlmMetrics`](tollgate_models::LlmMetrics), which the
//! provider layer records per upstream attempt.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Meter},
};
use std::sync::OnceLock;

static METRICS: OnceLock<GatewayMetrics> = OnceLock::new();

/// Quota denials and accumulated cost.
#[derive(Clone)]
pub struct GatewayMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Calls denied by the quota tracker
    pub quota_denials: Counter<u64>,
    /// Dollars recorded into the usage ledger
    pub cost: Counter<f64>,
}

impl std::fmt::Debug for GatewayMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayMetrics").finish_non_exhaustive()
    }
}

impl GatewayMetrics {
    fn init() -> Self {
        let meter = global::meter("tollgate_gateway");

        Self {
            _meter: meter.clone(),
            quota_denials: meter
                .u64_counter("gateway.quota.denials")
                .with_description("Calls denied by the RPM/TPM quota")
                .build(),
            cost: meter
                .f64_counter("gateway.cost")
                .with_unit("USD")
                .with_description("Cost of successful calls")
                .build(),
        }
    }

    /// Get the global gateway metrics instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record a quota denial; `limit` is `rpm` or `tpm`.
    pub fn record_denial(&self, kind: &str, limit: &'static str) {
        self.quota_denials.add(
            1,
            &[
                KeyValue::new("kind", kind.to_string()),
                KeyValue::new("limit", limit),
            ],
        );
    }

    /// Record the cost of one successful call.
    pub fn record_cost(&self, model: &str, dollars: f64) {
        self.cost
            .add(dollars, &[KeyValue::new("model", model.to_string())]);
    }
}
