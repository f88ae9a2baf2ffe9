//! Upstream provider errors and retry classification.

/// Provider failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// The request never produced an HTTP response (connect, DNS, timeout)
    #[display("Request failed: {}", _0)]
    Http(String),
    /// The provider answered with a non-2xx status
    #[display("HTTP {} error: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },
    /// The response body did not match the provider's schema
    #[display("Failed to parse response: {}", _0)]
    Parse(String),
    /// The response parsed but carried no choices or embeddings
    #[display("Response contained no {}", _0)]
    EmptyResponse(String),
    /// The request could not be built (bad header value, client setup)
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),
}

impl ProviderErrorKind {
    /// Check if this error type should be retried.
    ///
    /// Network failures, timeouts, rate limiting and 5xx responses are
    /// transient. Other 4xx responses and malformed bodies are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderErrorKind::Http(_) => true,
            ProviderErrorKind::Api { status, .. } => {
                matches!(*status, 408 | 429) || (500..=599).contains(status)
            }
            ProviderErrorKind::Parse(_)
            | ProviderErrorKind::EmptyResponse(_)
            | ProviderErrorKind::InvalidRequest(_) => false,
        }
    }

    /// Short label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderErrorKind::Http(_) => "network",
            ProviderErrorKind::Api { status: 429, .. } => "rate_limit",
            ProviderErrorKind::Api { status: 401 | 403, .. } => "auth",
            ProviderErrorKind::Api { status, .. } if *status >= 500 => "server",
            ProviderErrorKind::Api { .. } => "invalid_request",
            ProviderErrorKind::Parse(_) | ProviderErrorKind::EmptyResponse(_) => "malformed",
            ProviderErrorKind::InvalidRequest(_) => "invalid_request",
        }
    }
}

/// Provider error with source location tracking.
///
/// # Examples
///
/// ```
/// use tollgate_error::{ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::new(ProviderErrorKind::Api {
///     status: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
///
/// let err = ProviderError::new(ProviderErrorKind::Api {
///     status: 401,
///     message: "Invalid API key".to_string(),
/// });
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Trait for errors that support retry logic.
///
/// The retrier asks each failed attempt whether another attempt could
/// succeed. Quota denials and configuration errors always answer `false`.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
