//! Cost and usage accounting.

use crate::{DailyUsage, LifetimeSummary, PricingTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tollgate_core::{Clock, SystemClock};
use tracing::{info, instrument};

/// Ledger switch, read from the `[ledger]` configuration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Record successful calls into the ledger
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

/// Accumulates per-day and lifetime usage of successful calls.
///
/// Day buckets are keyed by the clock's local calendar date, created on a
/// day's first call and never removed.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tollgate_ledger::{PricingTable, UsageLedger};
///
/// let ledger = UsageLedger::new(PricingTable::default());
/// ledger.record("gpt-4", 1500, Duration::from_millis(800), Some(1000), Some(500));
///
/// let today = ledger.daily_summary(None);
/// assert_eq!(*today.requests(), 1);
/// assert!((today.total_cost() - 0.06).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct UsageLedger {
    pricing: PricingTable,
    clock: Arc<dyn Clock>,
    state: Mutex<LifetimeSummary>,
}

impl UsageLedger {
    /// Create an empty ledger on the system clock.
    pub fn new(pricing: PricingTable) -> Self {
        Self::with_clock(pricing, Arc::new(SystemClock))
    }

    /// Create an empty ledger on an explicit clock.
    pub fn with_clock(pricing: PricingTable, clock: Arc<dyn Clock>) -> Self {
        Self {
            pricing,
            clock,
            state: Mutex::new(LifetimeSummary::default()),
        }
    }

    /// Pricing used to cost calls.
    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    fn lock(&self) -> MutexGuard<'_, LifetimeSummary> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one successful call and return its cost in dollars.
    #[instrument(level = "debug", skip(self))]
    pub fn record(
        &self,
        model: &str,
        tokens_used: u64,
        latency: Duration,
        input_tokens: Option<u64>,
        output_tokens: Option<u64>,
    ) -> f64 {
        let cost = self
            .pricing
            .cost(model, tokens_used, input_tokens, output_tokens);
        let today = self.clock.today();

        let total_cost = {
            let mut state = self.lock();
            state.day_mut(today).add(model, tokens_used, cost);
            state.add(tokens_used, cost, latency.as_secs_f64());
            *state.total_cost()
        };

        info!(
            model,
            tokens = tokens_used,
            cost = %format!("{cost:.4}"),
            total_cost = %format!("{total_cost:.4}"),
            "Recorded API usage"
        );

        cost
    }

    /// Usage for `date`, or today when `None`. Idle days report zeros.
    pub fn daily_summary(&self, date: Option<NaiveDate>) -> DailyUsage {
        let date = date.unwrap_or_else(|| self.clock.today());
        self.lock()
            .daily_breakdown()
            .get(&date)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of lifetime totals with the full daily breakdown.
    pub fn lifetime_summary(&self) -> LifetimeSummary {
        self.lock().clone()
    }
}
