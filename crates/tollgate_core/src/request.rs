//! Provider-agnostic request types.

use crate::ChatMessage;
use serde::{Deserialize, Serialize};

/// The two independently priced request types.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CallKind {
    /// Chat completion
    Completion,
    /// Embedding
    Embedding,
}

/// A fully resolved chat completion request.
///
/// Model, temperature and token limit are already resolved against the
/// gateway's defaults by the time a request reaches a provider.
///
/// # Examples
///
/// ```
/// use tollgate_core::{ChatMessage, CompletionRequest};
///
/// let request = CompletionRequest::builder()
///     .model("gpt-4")
///     .messages(vec![ChatMessage::user("Hi")])
///     .temperature(0.2f32)
///     .max_tokens(64u32)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.model, "gpt-4");
/// assert_eq!(request.max_tokens, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Creates a new builder.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }
}

/// Embedding input: one text or a batch.
///
/// Serializes as a bare string or an array of strings, which is what both
/// upstream dialects accept in the `input` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(untagged)]
pub enum EmbeddingInput {
    /// A single text
    Single(String),
    /// Several texts embedded in one call
    Batch(Vec<String>),
}

impl EmbeddingInput {
    /// Number of texts in this input.
    pub fn len(&self) -> usize {
        match self {
            EmbeddingInput::Single(_) => 1,
            EmbeddingInput::Batch(texts) => texts.len(),
        }
    }

    /// True for an empty batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The texts as a slice.
    pub fn texts(&self) -> &[String] {
        match self {
            EmbeddingInput::Single(text) => std::slice::from_ref(text),
            EmbeddingInput::Batch(texts) => texts,
        }
    }
}

impl From<&str> for EmbeddingInput {
    fn from(text: &str) -> Self {
        EmbeddingInput::Single(text.to_string())
    }
}

/// An embedding request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Embedding model identifier
    pub model: String,
    /// Text(s) to embed
    pub input: EmbeddingInput,
}

impl EmbeddingRequest {
    /// Create a new embedding request.
    pub fn new(model: impl Into<String>, input: impl Into<EmbeddingInput>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
        }
    }
}

/// A request routed to whichever provider the gateway was built with.
#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum ProviderRequest {
    /// Chat completion
    Completion(CompletionRequest),
    /// Embedding
    Embedding(EmbeddingRequest),
}

impl ProviderRequest {
    /// Which request type this is.
    pub fn kind(&self) -> CallKind {
        match self {
            ProviderRequest::Completion(_) => CallKind::Completion,
            ProviderRequest::Embedding(_) => CallKind::Embedding,
        }
    }

    /// Requested model identifier.
    pub fn model(&self) -> &str {
        match self {
            ProviderRequest::Completion(request) => &request.model,
            ProviderRequest::Embedding(request) => &request.model,
        }
    }
}
