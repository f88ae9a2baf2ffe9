//! JSON bodies shared by both upstream dialects.
//!
//! Both providers speak the same request shapes. Responses are parsed
//! leniently here; each dialect decides which optional fields it insists on.

use serde::{Deserialize, Serialize};
use tollgate_core::{ChatMessage, EmbeddingInput, Usage};

/// Chat completion request body
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Embedding request body
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct EmbeddingBody<'a> {
    pub model: &'a str,
    pub input: &'a EmbeddingInput,
}

/// Chat completion response
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if any.
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Embedding response
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct EmbeddingResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

impl EmbeddingResponse {
    /// Vectors ordered by their `index` field.
    pub fn into_vectors(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|item| item.index);
        self.data.into_iter().map(|item| item.embedding).collect()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct EmbeddingData {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}

/// Token usage as it appears on the wire
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub(crate) struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl From<WireUsage> for Usage {
    fn from(usage: WireUsage) -> Self {
        // Some gateways omit total_tokens.
        let total = if usage.total_tokens == 0 {
            usage.prompt_tokens + usage.completion_tokens
        } else {
            usage.total_tokens
        };
        Usage::new(usage.prompt_tokens, usage.completion_tokens, total)
    }
}
