//! Alternate provider: the OpenRouter gateway.

use crate::client::ApiClient;
use crate::provider::UsagePolicy;
use crate::{Credentials, Provider, ProviderKind, ProviderSettings};
use async_trait::async_trait;
use std::time::Duration;
use tollgate_core::{CompletionRequest, EmbeddingRequest, NormalizedResponse};
use tollgate_error::{ConfigError, ProviderResult};
use tracing::{debug, instrument};

/// Client for the alternate routing gateway.
///
/// Same JSON shapes as the primary API, but `usage` is optional and
/// missing usage normalizes to zeros.
#[derive(Debug, Clone)]
pub struct AlternateProvider {
    client: ApiClient,
}

impl AlternateProvider {
    /// Build the provider from settings and credentials.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `OPENROUTER_API_KEY` is missing or the
    /// HTTP client cannot be built.
    pub fn new(settings: &ProviderSettings, credentials: &Credentials) -> Result<Self, ConfigError> {
        let api_key = credentials.api_key_for(ProviderKind::Alternate)?;

        let mut headers = Vec::new();
        if let Some(title) = &settings.app_title {
            headers.push(("X-Title", title.clone()));
        }

        let client = ApiClient::new(
            settings.alternate_base_url.as_str(),
            api_key,
            Duration::from_secs(settings.timeout_secs),
            headers,
        )?;

        debug!(base_url = %settings.alternate_base_url, "Created alternate provider");
        Ok(Self { client })
    }
}

#[async_trait]
impl Provider for AlternateProvider {
    fn name(&self) -> &'static str {
        ProviderKind::Alternate.name()
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<NormalizedResponse> {
        self.client
            .chat_completion(request, UsagePolicy::Optional)
            .await
    }

    #[instrument(skip(self, request), fields(model = %request.model, inputs = request.input.len()))]
    async fn embed(&self, request: &EmbeddingRequest) -> ProviderResult<NormalizedResponse> {
        self.client.embeddings(request, UsagePolicy::Optional).await
    }
}
