//! Tollgate - LLM request gateway
//!
//! Tollgate sits between application code and an upstream LLM provider and
//! gives every completion and embedding call the same treatment:
//!
//! - **Quota**: calls and tokens are counted over a trailing 60-second
//!   window and over-limit calls are refused immediately, without waiting
//!   and without contacting the provider.
//! - **Retry**: transient upstream failures are retried on a fixed delay
//!   (or a doubling one, through the standalone helpers).
//! - **Normalization**: both supported provider dialects map into one
//!   response shape.
//! - **Accounting**: successful calls are priced and accumulated per day
//!   and per model.
//!
//! # Quick Start
//!
//! ```no_run
//! use tollgate::{ChatMessage, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tollgate::init_console_telemetry()?;
//!
//!     let gateway = Gateway::from_env()?;
//!     let reply = gateway
//!         .complete(vec![ChatMessage::user("Hello!")], None, None, None)
//!         .await?;
//!     println!("{}", reply.content);
//!
//!     let mood = gateway.classify_sentiment("What a lovely day").await;
//!     println!("{mood}");
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Tollgate is organized as a workspace with focused crates:
//!
//! - `tollgate_error` - Error types
//! - `tollgate_core` - Request and response shapes, clocks
//! - `tollgate_rate_limit` - Quota tracking and retry policies
//! - `tollgate_models` - Provider implementations and routing
//! - `tollgate_ledger` - Pricing and usage accounting
//!
//! This crate (`tollgate`) wires them together and re-exports what callers
//! need.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod gateway;
mod helpers;
mod metrics;
mod sentiment;
mod telemetry;

pub use config::{GatewayConfig, ModelDefaults, RequestProfile};
pub use gateway::{Gateway, GatewayStatus, estimate_tokens};
pub use helpers::{
    DEFAULT_EMBEDDING_DIMENSIONS, complete_with_retry, embed_batch_with_retry,
    embedding_dimensions,
};
pub use metrics::GatewayMetrics;
pub use sentiment::Sentiment;
pub use telemetry::{DEFAULT_FILTER, init_console_telemetry, init_telemetry};

// Re-export the types callers work with directly.
pub use tollgate_core::{
    CallKind, ChatMessage, Clock, Completion, CompletionRequest, EmbeddingInput,
    EmbeddingRequest, ManualClock, NormalizedResponse, ProviderRequest, ResponseOutput, Role,
    SystemClock, Usage,
};
pub use tollgate_error::{
    ConfigError, ProviderError, ProviderErrorKind, QuotaError, QuotaErrorKind, TollgateError,
    TollgateErrorKind, TollgateResult,
};
pub use tollgate_ledger::{
    DailyUsage, LedgerSettings, LifetimeSummary, ModelPrice, ModelUsage, PricingTable,
    UsageLedger,
};
pub use tollgate_models::{
    AlternateProvider, Credentials, LlmMetrics, PrimaryProvider, Provider, ProviderKind,
    ProviderRouter, ProviderSettings,
};
pub use tollgate_rate_limit::{
    BackoffRetrier, QuotaConfig, QuotaStatus, QuotaTracker, RetryConfig, RetryPolicy,
};
