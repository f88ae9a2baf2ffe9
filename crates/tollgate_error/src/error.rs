//! Top-level error wrapper types.

use crate::{ConfigError, ProviderError, QuotaError, RetryableError};

/// The foundation error enum.
///
/// # Examples
///
/// ```
/// use tollgate_error::{QuotaError, QuotaErrorKind, TollgateError};
///
/// let quota = QuotaError::new(QuotaErrorKind::RequestsPerMinute { limit: 2 });
/// let err: TollgateError = quota.into();
/// assert!(err.is_quota_exceeded());
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TollgateErrorKind {
    /// Quota denial (not retried)
    #[from(QuotaError)]
    Quota(QuotaError),
    /// Upstream provider failure
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Tollgate error with kind discrimination.
///
/// # Examples
///
/// ```
/// use tollgate_error::{ConfigError, TollgateResult};
///
/// fn might_fail() -> TollgateResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tollgate Error: {}", _0)]
pub struct TollgateError(Box<TollgateErrorKind>);

impl TollgateError {
    /// Create a new error from a kind.
    pub fn new(kind: TollgateErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TollgateErrorKind {
        &self.0
    }

    /// True when the call was denied by the quota tracker.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self.kind(), TollgateErrorKind::Quota(_))
    }

    /// True when the upstream provider failed (after any retries).
    pub fn is_provider_failure(&self) -> bool {
        matches!(self.kind(), TollgateErrorKind::Provider(_))
    }

    /// The quota denial, if this is one.
    pub fn as_quota(&self) -> Option<&QuotaError> {
        match self.kind() {
            TollgateErrorKind::Quota(err) => Some(err),
            _ => None,
        }
    }

    /// The provider failure, if this is one.
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self.kind() {
            TollgateErrorKind::Provider(err) => Some(err),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to TollgateErrorKind
impl<T> From<T> for TollgateError
where
    T: Into<TollgateErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl RetryableError for TollgateError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            TollgateErrorKind::Provider(err) => err.is_retryable(),
            TollgateErrorKind::Quota(_) | TollgateErrorKind::Config(_) => false,
        }
    }
}

/// Result type for Tollgate operations.
pub type TollgateResult<T> = std::result::Result<T, TollgateError>;
