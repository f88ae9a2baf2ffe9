//! Upstream LLM providers for Tollgate.
//!
//! Two dialects are supported behind the [`Provider`] trait:
//!
//! - [`PrimaryProvider`]: the primary vendor API, with optional organization
//!   header and mandatory usage reporting.
//! - [`AlternateProvider`]: the alternate routing gateway, where usage is
//!   optional.
//!
//! [`ProviderRouter`] picks one of them from [`ProviderSettings`] and
//! [`Credentials`] at construction and records [`LlmMetrics`] for every call.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod alternate;
mod client;
mod metrics;
mod primary;
mod provider;
mod router;
mod settings;
mod wire;

pub use alternate::AlternateProvider;
pub use metrics::LlmMetrics;
pub use primary::PrimaryProvider;
pub use provider::Provider;
pub use router::ProviderRouter;
pub use settings::{Credentials, ProviderKind, ProviderSettings};
