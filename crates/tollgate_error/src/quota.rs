//! Quota denial errors.

/// Which quota dimension denied a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum QuotaErrorKind {
    /// The trailing 60-second window already holds `limit` calls.
    #[display("requests per minute limit of {} reached", limit)]
    RequestsPerMinute {
        /// Configured RPM limit
        limit: u32,
    },
    /// Admitting the reservation would push the window past `limit` tokens.
    #[display(
        "tokens per minute limit of {} exceeded ({} in window, {} requested)",
        limit,
        used,
        requested
    )]
    TokensPerMinute {
        /// Configured TPM limit
        limit: u64,
        /// Tokens already held by the window
        used: u64,
        /// Tokens the denied reservation asked for
        requested: u64,
    },
}

/// Quota denial with location tracking.
///
/// A denial is a typed result, not a fault: the tracker's state is left
/// untouched and the caller decides whether to wait or give up.
///
/// # Examples
///
/// ```
/// use tollgate_error::{QuotaError, QuotaErrorKind};
///
/// let err = QuotaError::new(QuotaErrorKind::RequestsPerMinute { limit: 60 });
/// assert!(err.is_requests_per_minute());
/// assert!(format!("{}", err).contains("requests per minute"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Quota Exceeded: {} at line {} in {}", kind, line, file)]
pub struct QuotaError {
    kind: QuotaErrorKind,
    line: u32,
    file: &'static str,
}

impl QuotaError {
    /// Create a new quota error with caller location tracking.
    #[track_caller]
    pub fn new(kind: QuotaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &QuotaErrorKind {
        &self.kind
    }

    /// True when the request-count dimension denied the reservation.
    pub fn is_requests_per_minute(&self) -> bool {
        matches!(self.kind, QuotaErrorKind::RequestsPerMinute { .. })
    }

    /// True when the token dimension denied the reservation.
    pub fn is_tokens_per_minute(&self) -> bool {
        matches!(self.kind, QuotaErrorKind::TokensPerMinute { .. })
    }
}
