//! Error types for the Tollgate gateway.
//!
//! This crate provides the error types shared by every Tollgate crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Quota denials and provider failures are separate kinds so that a front-facing
//! layer can map the first to a throttling response and the second to an
//! upstream-unavailable response.
//!
//! # Examples
//!
//! ```
//! use tollgate_error::{ConfigError, TollgateResult};
//!
//! fn load() -> TollgateResult<String> {
//!     Err(ConfigError::new("OPENAI_API_KEY is not set"))?
//! }
//!
//! let err = load().unwrap_err();
//! assert!(!err.is_quota_exceeded());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod provider;
mod quota;

pub use config::ConfigError;
pub use error::{TollgateError, TollgateErrorKind, TollgateResult};
pub use provider::{ProviderError, ProviderErrorKind, ProviderResult, RetryableError};
pub use quota::{QuotaError, QuotaErrorKind};
