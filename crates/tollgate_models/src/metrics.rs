//! Per-attempt upstream metrics.
//!
//! [`ProviderRouter`](crate::ProviderRouter) records one attempt for every
//! upstream exchange, retries included. Without an installed meter provider
//! the instruments are no-ops.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use std::sync::OnceLock;
use std::time::Duration;
use tollgate_core::{CallKind, Usage};

static METRICS: OnceLock<LlmMetrics> = OnceLock::new();

/// Outcome label for a successful attempt.
pub const OUTCOME_OK: &str = "ok";

/// Upstream attempt, latency and token instruments.
#[derive(Clone)]
pub struct LlmMetrics {
    /// Attempts by provider, kind and outcome (`ok` or an error label)
    pub attempts: Counter<u64>,
    /// Latency of successful attempts
    pub latency: Histogram<f64>,
    /// Tokens by kind and direction (`prompt` or `completion`)
    pub tokens: Counter<u64>,
}

impl std::fmt::Debug for LlmMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmMetrics").finish_non_exhaustive()
    }
}

impl LlmMetrics {
    fn init() -> Self {
        let meter = global::meter("tollgate_upstream");

        Self {
            attempts: meter
                .u64_counter("upstream.attempts")
                .with_description("Upstream exchanges, retries included")
                .build(),
            latency: meter
                .f64_histogram("upstream.latency")
                .with_unit("s")
                .with_description("Latency of successful upstream exchanges")
                .build(),
            tokens: meter
                .u64_counter("upstream.tokens")
                .with_description("Tokens reported by the provider")
                .build(),
        }
    }

    /// Get the global instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record one exchange. `outcome` is [`OUTCOME_OK`] or the error label;
    /// `latency` is only known for successful exchanges.
    pub fn record_attempt(
        &self,
        provider: &'static str,
        kind: CallKind,
        outcome: &'static str,
        latency: Option<Duration>,
    ) {
        self.attempts.add(
            1,
            &[
                KeyValue::new("provider", provider),
                KeyValue::new("kind", kind.as_ref().to_string()),
                KeyValue::new("outcome", outcome),
            ],
        );

        if let Some(latency) = latency {
            self.latency.record(
                latency.as_secs_f64(),
                &[
                    KeyValue::new("provider", provider),
                    KeyValue::new("kind", kind.as_ref().to_string()),
                ],
            );
        }
    }

    /// Record token usage split by direction.
    pub fn record_usage(&self, kind: CallKind, model: &str, usage: &Usage) {
        for (direction, count) in token_split(usage) {
            if count > 0 {
                self.tokens.add(
                    count,
                    &[
                        KeyValue::new("kind", kind.as_ref().to_string()),
                        KeyValue::new("model", model.to_string()),
                        KeyValue::new("direction", direction),
                    ],
                );
            }
        }
    }
}

/// Prompt and completion counts; when a provider only reports a total, the
/// remainder is attributed to the prompt.
fn token_split(usage: &Usage) -> [(&'static str, u64); 2] {
    let prompt = usage
        .prompt_tokens
        .max(usage.total_tokens.saturating_sub(usage.completion_tokens));
    [("prompt", prompt), ("completion", usage.completion_tokens)]
}
