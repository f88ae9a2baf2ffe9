//! Configuration structures for quotas and retries.
//!
//! Both structs deserialize from the `[quota]` and `[retry]` tables of
//! `tollgate.toml`; every field has a default so partial tables are fine.
//!
//! ```toml
//! [quota]
//! rpm = 60
//! tpm = 1_000_000
//!
//! [retry]
//! max_attempts = 3
//! delay_secs = 1.0
//! exponential_initial_secs = 1.0
//! ```

use crate::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tollgate_error::ConfigError;

/// Requests-per-minute and tokens-per-minute limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct QuotaConfig {
    /// Requests per minute limit
    #[serde(default = "default_rpm")]
    pub rpm: u32,

    /// Tokens per minute limit
    #[serde(default = "default_tpm")]
    pub tpm: u64,
}

fn default_rpm() -> u32 {
    60
}

fn default_tpm() -> u64 {
    1_000_000
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            rpm: default_rpm(),
            tpm: default_tpm(),
        }
    }
}

impl QuotaConfig {
    /// Create a quota configuration.
    pub fn new(rpm: u32, tpm: u64) -> Self {
        Self { rpm, tpm }
    }

    /// Rejects zero limits, which would deny every call.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpm == 0 {
            return Err(ConfigError::new("quota.rpm must be greater than zero"));
        }
        if self.tpm == 0 {
            return Err(ConfigError::new("quota.tpm must be greater than zero"));
        }
        Ok(())
    }
}

/// Retry budget for the gateway's completion and embedding path.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts, in seconds
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,

    /// First delay of the doubling policy used by the standalone retry
    /// helpers, in seconds
    #[serde(default = "default_delay_secs")]
    pub exponential_initial_secs: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_secs() -> f64 {
    1.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_delay_secs(),
            exponential_initial_secs: default_delay_secs(),
        }
    }
}

impl RetryConfig {
    /// Validates the attempt budget and delay.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for zero attempts or a negative or
    /// non-finite delay.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::new("retry.max_attempts must be at least 1"));
        }
        for (name, secs) in [
            ("delay_secs", self.delay_secs),
            ("exponential_initial_secs", self.exponential_initial_secs),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ConfigError::new(format!(
                    "retry.{name} must be a non-negative number, got {secs}"
                )));
            }
        }
        Ok(())
    }

    /// The fixed-delay policy used on the gateway's main path.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts, secs_to_duration(self.delay_secs))
    }

    /// The doubling policy used by the standalone retry helpers.
    pub fn exponential_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(secs_to_duration(self.exponential_initial_secs))
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}
