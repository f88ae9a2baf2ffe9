//! Sliding-window quota tracker.
//!
//! The tracker keeps two ordered sequences: the instants of admitted calls,
//! and `(instant, tokens)` pairs for admitted token reservations. Both are
//! trimmed to the trailing [`WINDOW`] lazily, on each reservation attempt,
//! and the whole evict-check-record sequence runs under one lock so that
//! concurrent callers never check against a half-evicted window.

use crate::QuotaConfig;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tollgate_core::{Clock, SystemClock};
use tollgate_error::{QuotaError, QuotaErrorKind};
use tracing::{debug, instrument, warn};

/// Length of the sliding window.
pub const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct QuotaWindow {
    calls: VecDeque<Instant>,
    tokens: VecDeque<(Instant, u64)>,
    // Sum of `tokens`, kept in step with pushes and evictions.
    token_total: u64,
}

impl QuotaWindow {
    /// Drops entries strictly older than `now - WINDOW`.
    fn evict(&mut self, now: Instant) {
        let Some(window_start) = now.checked_sub(WINDOW) else {
            return;
        };

        while self.calls.front().is_some_and(|at| *at < window_start) {
            self.calls.pop_front();
        }

        while let Some(&(at, tokens)) = self.tokens.front() {
            if at >= window_start {
                break;
            }
            self.tokens.pop_front();
            self.token_total = self.token_total.saturating_sub(tokens);
        }
    }

    fn push_tokens(&mut self, now: Instant, tokens: u64) {
        self.tokens.push_back((now, tokens));
        self.token_total = self.token_total.saturating_add(tokens);
    }
}

/// Snapshot of the current window, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotaStatus {
    /// Calls admitted in the trailing window
    pub requests_in_window: u32,
    /// Configured RPM limit
    pub request_limit: u32,
    /// Tokens charged in the trailing window
    pub tokens_in_window: u64,
    /// Configured TPM limit
    pub token_limit: u64,
}

impl QuotaStatus {
    /// Calls that could still be admitted right now.
    pub fn requests_remaining(&self) -> u32 {
        self.request_limit.saturating_sub(self.requests_in_window)
    }

    /// Tokens that could still be reserved right now.
    pub fn tokens_remaining(&self) -> u64 {
        self.token_limit.saturating_sub(self.tokens_in_window)
    }
}

/// In-memory RPM/TPM quota tracker.
///
/// The single authority on whether a call may proceed now. [`reserve`]
/// never blocks or sleeps: it admits and records the call, or denies it
/// and leaves the window exactly as it was.
///
/// [`reserve`]: QuotaTracker::reserve
///
/// # Example
///
/// ```
/// use tollgate_rate_limit::{QuotaConfig, QuotaTracker};
///
/// let tracker = QuotaTracker::new(QuotaConfig::new(100, 150));
/// tracker.reserve(100).unwrap();
///
/// // 100 + 60 > 150
/// let denied = tracker.reserve(60).unwrap_err();
/// assert!(denied.is_tokens_per_minute());
///
/// // 100 + 50 == 150
/// tracker.reserve(50).unwrap();
/// ```
#[derive(Debug)]
pub struct QuotaTracker {
    config: QuotaConfig,
    clock: Arc<dyn Clock>,
    window: Mutex<QuotaWindow>,
}

impl QuotaTracker {
    /// Create a tracker on the system clock.
    pub fn new(config: QuotaConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a tracker on an explicit clock.
    pub fn with_clock(config: QuotaConfig, clock: Arc<dyn Clock>) -> Self {
        debug!(rpm = config.rpm, tpm = config.tpm, "Creating quota tracker");
        Self {
            config,
            clock,
            window: Mutex::new(QuotaWindow::default()),
        }
    }

    /// The limits this tracker enforces.
    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, QuotaWindow> {
        // Nothing inside the critical section panics, so a poisoned lock still
        // guards a consistent window.
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve one call and `tokens_needed` tokens against the window.
    ///
    /// The RPM check runs first: a call denied for RPM never touches the
    /// token window, and a call denied for TPM is not counted as a call.
    ///
    /// # Errors
    ///
    /// Returns a [`QuotaError`] of kind `RequestsPerMinute` when the window
    /// already holds `rpm` calls, or `TokensPerMinute` when the reservation
    /// would push the token sum past `tpm`.
    #[instrument(level = "debug", skip(self))]
    pub fn reserve(&self, tokens_needed: u64) -> Result<(), QuotaError> {
        let now = self.clock.now();
        let mut window = self.lock();
        window.evict(now);

        if window.calls.len() >= self.config.rpm as usize {
            warn!(
                calls = window.calls.len(),
                limit = self.config.rpm,
                "Requests per minute limit reached"
            );
            return Err(QuotaError::new(QuotaErrorKind::RequestsPerMinute {
                limit: self.config.rpm,
            }));
        }

        let used = window.token_total;
        if used.saturating_add(tokens_needed) > self.config.tpm {
            warn!(
                used,
                requested = tokens_needed,
                limit = self.config.tpm,
                "Tokens per minute limit exceeded"
            );
            return Err(QuotaError::new(QuotaErrorKind::TokensPerMinute {
                limit: self.config.tpm,
                used,
                requested: tokens_needed,
            }));
        }

        window.calls.push_back(now);
        if tokens_needed > 0 {
            window.push_tokens(now, tokens_needed);
        }

        debug!(
            calls = window.calls.len(),
            tokens = window.token_total,
            "Reservation admitted"
        );
        Ok(())
    }

    /// Charge tokens that were consumed beyond an earlier reservation.
    ///
    /// Used after a call completes and reports more usage than was
    /// estimated up front. The tokens are already spent, so this never
    /// denies and does not count as another call; it only makes later
    /// reservations see the true usage.
    #[instrument(level = "debug", skip(self))]
    pub fn reconcile(&self, extra_tokens: u64) {
        if extra_tokens == 0 {
            return;
        }

        let now = self.clock.now();
        let mut window = self.lock();
        window.evict(now);
        window.push_tokens(now, extra_tokens);

        if window.token_total > self.config.tpm {
            warn!(
                tokens = window.token_total,
                limit = self.config.tpm,
                "Reconciled usage overshoots tokens per minute limit"
            );
        }
    }

    /// Evict stale entries and report the current window.
    pub fn status(&self) -> QuotaStatus {
        let now = self.clock.now();
        let mut window = self.lock();
        window.evict(now);

        QuotaStatus {
            requests_in_window: u32::try_from(window.calls.len()).unwrap_or(u32::MAX),
            request_limit: self.config.rpm,
            tokens_in_window: window.token_total,
            token_limit: self.config.tpm,
        }
    }
}
