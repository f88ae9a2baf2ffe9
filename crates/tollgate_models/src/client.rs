//! HTTP plumbing shared by both provider dialects.

use crate::provider::{UsagePolicy, normalize_completion, normalize_embedding};
use crate::wire::{ChatCompletionBody, ChatCompletionResponse, EmbeddingBody, EmbeddingResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tollgate_core::{CompletionRequest, EmbeddingRequest, NormalizedResponse};
use tollgate_error::{ConfigError, ProviderError, ProviderErrorKind, ProviderResult};
use tracing::{debug, error, instrument};

/// Bearer-authenticated JSON client rooted at one base URL.
#[derive(Clone)]
pub(crate) struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    headers: Vec<(&'static str, String)>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client with a per-request timeout and extra static headers.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        headers: Vec<(&'static str, String)>,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            headers,
        })
    }

    /// POST `body` to `{base_url}/{path}` and parse the JSON response.
    ///
    /// Returns the parsed body together with the time from sending the
    /// request to finishing the parse.
    #[instrument(skip(self, body), fields(base_url = %self.base_url))]
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> ProviderResult<(R, Duration)>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Sending request to {}", url);

        let mut request = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(body);

        for (name, value) in &self.headers {
            request = request.header(*name, value);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            error!("Request failed: {}", e);
            ProviderError::new(ProviderErrorKind::Http(e.to_string()))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Unknown error".to_string());
            error!(status = status.as_u16(), "API returned error: {}", message);
            return Err(ProviderError::new(ProviderErrorKind::Api {
                status: status.as_u16(),
                message,
            }));
        }

        let text = response.text().await.map_err(|e| {
            error!("Failed to read response body: {}", e);
            ProviderError::new(ProviderErrorKind::Http(e.to_string()))
        })?;

        let parsed = serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse response: {}", e);
            ProviderError::new(ProviderErrorKind::Parse(e.to_string()))
        })?;

        Ok((parsed, started.elapsed()))
    }

    /// One `chat/completions` exchange, normalized under `policy`.
    pub(crate) async fn chat_completion(
        &self,
        request: &CompletionRequest,
        policy: UsagePolicy,
    ) -> ProviderResult<NormalizedResponse> {
        let body = ChatCompletionBody {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let (response, latency): (ChatCompletionResponse, _) =
            self.post_json("chat/completions", &body).await?;
        normalize_completion(response, request, latency, policy)
    }

    /// One `embeddings` exchange, normalized under `policy`.
    pub(crate) async fn embeddings(
        &self,
        request: &EmbeddingRequest,
        policy: UsagePolicy,
    ) -> ProviderResult<NormalizedResponse> {
        let body = EmbeddingBody {
            model: &request.model,
            input: &request.input,
        };

        let (response, latency): (EmbeddingResponse, _) =
            self.post_json("embeddings", &body).await?;
        normalize_embedding(response, request, latency, policy)
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to
/// the raw body.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(json) => json
            .pointer("/error/message")
            .or_else(|| json.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .or_else(|| Some(trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::error_message;

    #[test]
    fn extracts_nested_error_message() {
        let body = r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("Rate limit reached"));
    }

    #[test]
    fn falls_back_to_raw_body() {
        assert_eq!(error_message("bad gateway").as_deref(), Some("bad gateway"));
        assert_eq!(error_message("  "), None);
    }
}
