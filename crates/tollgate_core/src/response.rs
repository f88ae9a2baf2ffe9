//! Normalized response types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token usage reported by a provider.
///
/// Providers that omit usage normalize to all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt / input
    pub prompt_tokens: u64,
    /// Tokens in the completion (zero for embeddings)
    pub completion_tokens: u64,
    /// Total tokens billed
    pub total_tokens: u64,
}

impl Usage {
    /// Create a usage record.
    pub fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

/// The payload of a normalized response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOutput {
    /// Completion text
    Content(String),
    /// One embedding vector
    Vector(Vec<f32>),
    /// One embedding vector per input text
    Vectors(Vec<Vec<f32>>),
}

/// Provider-agnostic response shape.
///
/// Both upstream dialects map into this so downstream accounting never
/// needs to know which provider served the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    /// Content or embedding(s)
    pub output: ResponseOutput,
    /// Model that served the request, as reported by the provider
    pub model: String,
    /// Token usage
    pub usage: Usage,
    /// Wall-clock time between sending the request and parsing the response
    pub latency: Duration,
}

/// Result of a chat completion returned to gateway callers.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tollgate_core::{Completion, Usage};
///
/// let completion = Completion {
///     content: "Hello".to_string(),
///     model: "gpt-4".to_string(),
///     usage: Usage::new(5, 1, 6),
///     latency: Duration::from_millis(250),
/// };
/// assert_eq!(completion.latency_secs(), 0.25);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Generated text
    pub content: String,
    /// Model that served the request
    pub model: String,
    /// Token usage
    pub usage: Usage,
    /// Provider-side latency
    pub latency: Duration,
}

impl Completion {
    /// Latency in fractional seconds.
    pub fn latency_secs(&self) -> f64 {
        self.latency.as_secs_f64()
    }
}
