//! The provider seam and response normalization.

use crate::wire::{ChatCompletionResponse, EmbeddingResponse};
use async_trait::async_trait;
use std::time::Duration;
use tollgate_core::{
    CompletionRequest, EmbeddingInput, EmbeddingRequest, NormalizedResponse, ResponseOutput,
    Usage,
};
use tollgate_error::{ProviderError, ProviderErrorKind, ProviderResult};

/// One upstream LLM endpoint.
///
/// Implementations perform exactly one HTTP exchange per call. Retrying,
/// quota checks and accounting happen above this layer.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Provider name (e.g., "openai", "openrouter").
    fn name(&self) -> &'static str;

    /// Run a chat completion.
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<NormalizedResponse>;

    /// Embed one text or a batch.
    async fn embed(&self, request: &EmbeddingRequest) -> ProviderResult<NormalizedResponse>;
}

/// How strictly a dialect treats the optional `usage` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UsagePolicy {
    /// Missing usage is a malformed response.
    Required,
    /// Missing usage normalizes to zeros.
    Optional,
}

impl UsagePolicy {
    fn resolve(
        self,
        usage: Option<crate::wire::WireUsage>,
        what: &str,
    ) -> ProviderResult<Usage> {
        match (usage, self) {
            (Some(usage), _) => Ok(usage.into()),
            (None, UsagePolicy::Optional) => Ok(Usage::default()),
            (None, UsagePolicy::Required) => Err(ProviderError::new(ProviderErrorKind::Parse(
                format!("{what} response is missing usage"),
            ))),
        }
    }
}

pub(crate) fn normalize_completion(
    response: ChatCompletionResponse,
    request: &CompletionRequest,
    latency: Duration,
    policy: UsagePolicy,
) -> ProviderResult<NormalizedResponse> {
    let usage = policy.resolve(response.usage, "completion")?;
    let model = response
        .model
        .clone()
        .unwrap_or_else(|| request.model.clone());
    let content = response.first_content().ok_or_else(|| {
        ProviderError::new(ProviderErrorKind::EmptyResponse("choices".to_string()))
    })?;

    Ok(NormalizedResponse {
        output: ResponseOutput::Content(content),
        model,
        usage,
        latency,
    })
}

pub(crate) fn normalize_embedding(
    response: EmbeddingResponse,
    request: &EmbeddingRequest,
    latency: Duration,
    policy: UsagePolicy,
) -> ProviderResult<NormalizedResponse> {
    let usage = policy.resolve(response.usage, "embedding")?;
    let model = response
        .model
        .clone()
        .unwrap_or_else(|| request.model.clone());
    let mut vectors = response.into_vectors();

    if vectors.is_empty() {
        return Err(ProviderError::new(ProviderErrorKind::EmptyResponse(
            "embeddings".to_string(),
        )));
    }
    if vectors.len() != request.input.len() {
        return Err(ProviderError::new(ProviderErrorKind::Parse(format!(
            "expected {} embeddings, got {}",
            request.input.len(),
            vectors.len()
        ))));
    }

    let output = match &request.input {
        EmbeddingInput::Single(_) => ResponseOutput::Vector(vectors.swap_remove(0)),
        EmbeddingInput::Batch(_) => ResponseOutput::Vectors(vectors),
    };

    Ok(NormalizedResponse {
        output,
        model,
        usage,
        latency,
    })
}
