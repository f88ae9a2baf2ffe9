//! Quota enforcement and error recovery.
//!
//! This crate provides the two policies every upstream call passes through:
//!
//! - [`QuotaTracker`] keeps trailing 60-second windows of calls and tokens and
//!   admits or denies a reservation immediately, without ever sleeping.
//! - [`BackoffRetrier`] runs one upstream attempt at a time, waiting between
//!   attempts according to a [`RetryPolicy`], and hands back the last error
//!   untouched once the budget is spent.
//!
//! ```
//! use tollgate_rate_limit::{QuotaConfig, QuotaTracker};
//!
//! let tracker = QuotaTracker::new(QuotaConfig::new(2, 1_000));
//! assert!(tracker.reserve(100).is_ok());
//! assert!(tracker.reserve(100).is_ok());
//! assert!(tracker.reserve(100).unwrap_err().is_requests_per_minute());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod retry;
mod tracker;

pub use config::{QuotaConfig, RetryConfig};
pub use retry::{BackoffRetrier, EXPONENTIAL_MAX_ATTEMPTS, RetryAttempt, RetryPolicy};
pub use tracker::{QuotaStatus, QuotaTracker, WINDOW};
