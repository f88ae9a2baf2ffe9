//! Primary provider: the OpenAI API.

use crate::client::ApiClient;
use crate::provider::UsagePolicy;
use crate::{Credentials, Provider, ProviderKind, ProviderSettings};
use async_trait::async_trait;
use std::time::Duration;
use tollgate_core::{CompletionRequest, EmbeddingRequest, NormalizedResponse};
use tollgate_error::{ConfigError, ProviderResult};
use tracing::{debug, instrument};

/// Client for the primary vendor API.
///
/// Sends `OpenAI-Organization` when an organization is configured and
/// treats a response without `usage` as malformed.
#[derive(Debug, Clone)]
pub struct PrimaryProvider {
    client: ApiClient,
}

impl PrimaryProvider {
    /// Build the provider from settings and credentials.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `OPENAI_API_KEY` is missing or the HTTP
    /// client cannot be built.
    pub fn new(settings: &ProviderSettings, credentials: &Credentials) -> Result<Self, ConfigError> {
        let api_key = credentials.api_key_for(ProviderKind::Primary)?;

        let mut headers = Vec::new();
        if let Some(org) = &credentials.openai_organization {
            headers.push(("OpenAI-Organization", org.clone()));
        }

        let client = ApiClient::new(
            settings.primary_base_url.as_str(),
            api_key,
            Duration::from_secs(settings.timeout_secs),
            headers,
        )?;

        debug!(base_url = %settings.primary_base_url, "Created primary provider");
        Ok(Self { client })
    }
}

#[async_trait]
impl Provider for PrimaryProvider {
    fn name(&self) -> &'static str {
        ProviderKind::Primary.name()
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<NormalizedResponse> {
        self.client
            .chat_completion(request, UsagePolicy::Required)
            .await
    }

    #[instrument(skip(self, request), fields(model = %request.model, inputs = request.input.len()))]
    async fn embed(&self, request: &EmbeddingRequest) -> ProviderResult<NormalizedResponse> {
        self.client.embeddings(request, UsagePolicy::Required).await
    }
}
