//! Serializable usage snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Usage of one model within one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ModelUsage {
    /// Tokens consumed.
    tokens: u64,
    /// Dollars spent.
    cost: f64,
    /// Calls recorded.
    requests: u64,
}

impl ModelUsage {
    pub(crate) fn add(&mut self, tokens: u64, cost: f64) {
        self.tokens = self.tokens.saturating_add(tokens);
        self.cost += cost;
        self.requests += 1;
    }
}

/// Usage for one calendar day, broken down by model.
///
/// Days with no recorded calls report all zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct DailyUsage {
    /// Tokens consumed across all models.
    total_tokens: u64,
    /// Dollars spent across all models.
    total_cost: f64,
    /// Calls recorded across all models.
    requests: u64,
    /// Per-model breakdown, keyed by model identifier.
    models: BTreeMap<String, ModelUsage>,
}

impl DailyUsage {
    pub(crate) fn add(&mut self, model: &str, tokens: u64, cost: f64) {
        self.total_tokens = self.total_tokens.saturating_add(tokens);
        self.total_cost += cost;
        self.requests += 1;
        self.models
            .entry(model.to_string())
            .or_default()
            .add(tokens, cost);
    }

    /// Usage of a single model on this day.
    pub fn model(&self, model: &str) -> Option<&ModelUsage> {
        self.models.get(model)
    }
}

/// Totals since the ledger was created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct LifetimeSummary {
    /// Tokens consumed.
    total_tokens: u64,
    /// Dollars spent.
    total_cost: f64,
    /// Calls recorded.
    total_requests: u64,
    /// Mean call latency in seconds.
    average_latency_secs: f64,
    /// Every day with at least one recorded call.
    daily_breakdown: BTreeMap<NaiveDate, DailyUsage>,
}

impl LifetimeSummary {
    pub(crate) fn add(&mut self, tokens: u64, cost: f64, latency_secs: f64) {
        self.total_tokens = self.total_tokens.saturating_add(tokens);
        self.total_cost += cost;
        self.total_requests += 1;

        // Incremental mean over the post-increment count.
        let n = self.total_requests as f64;
        self.average_latency_secs = (self.average_latency_secs * (n - 1.0) + latency_secs) / n;
    }

    pub(crate) fn day_mut(&mut self, date: NaiveDate) -> &mut DailyUsage {
        self.daily_breakdown.entry(date).or_default()
    }
}
