//! Core data types for the Tollgate LLM request gateway.
//!
//! This crate provides the provider-agnostic request and response shapes
//! shared by the quota, provider, ledger and gateway crates, plus the
//! [`Clock`] abstraction used for sliding windows and day buckets.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod message;
mod request;
mod response;
mod role;

pub use clock::{Clock, ManualClock, SystemClock};
pub use message::ChatMessage;
pub use request::{
    CallKind, CompletionRequest, CompletionRequestBuilder, CompletionRequestBuilderError,
    EmbeddingInput, EmbeddingRequest, ProviderRequest,
};
pub use response::{Completion, NormalizedResponse, ResponseOutput, Usage};
pub use role::Role;
