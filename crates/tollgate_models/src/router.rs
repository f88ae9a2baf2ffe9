//! Provider selection.

use crate::metrics::OUTCOME_OK;
use crate::{
    AlternateProvider, Credentials, LlmMetrics, PrimaryProvider, Provider, ProviderKind,
    ProviderSettings,
};
use std::sync::Arc;
use tollgate_core::{NormalizedResponse, ProviderRequest};
use tollgate_error::{ConfigError, ProviderResult};
use tracing::{debug, instrument, warn};

/// Routes every call to the one provider chosen at construction.
///
/// Both dialects normalize into [`NormalizedResponse`], so callers never
/// branch on which upstream served a request.
#[derive(Debug, Clone)]
pub struct ProviderRouter {
    provider: Arc<dyn Provider>,
}

impl ProviderRouter {
    /// Build the router for `settings.kind`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when settings are invalid or the selected
    /// provider's API key is missing.
    pub fn new(settings: &ProviderSettings, credentials: &Credentials) -> Result<Self, ConfigError> {
        settings.validate()?;

        let provider: Arc<dyn Provider> = match settings.kind {
            ProviderKind::Primary => Arc::new(PrimaryProvider::new(settings, credentials)?),
            ProviderKind::Alternate => Arc::new(AlternateProvider::new(settings, credentials)?),
        };

        debug!(provider = provider.name(), "Provider selected");
        Ok(Self { provider })
    }

    /// Wrap an existing provider.
    pub fn from_provider(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Name of the selected provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Perform one upstream exchange.
    ///
    /// # Errors
    ///
    /// Propagates the provider's error unchanged.
    #[instrument(
        skip(self, request),
        fields(provider = self.provider.name(), kind = %request.kind(), model = request.model())
    )]
    pub async fn call(&self, request: &ProviderRequest) -> ProviderResult<NormalizedResponse> {
        let result = match request {
            ProviderRequest::Completion(completion) => self.provider.complete(completion).await,
            ProviderRequest::Embedding(embedding) => self.provider.embed(embedding).await,
        };

        let metrics = LlmMetrics::get();
        let kind = request.kind();
        match &result {
            Ok(response) => {
                debug!(
                    tokens = response.usage.total_tokens,
                    latency_ms = response.latency.as_millis() as u64,
                    "Upstream call succeeded"
                );
                metrics.record_attempt(
                    self.provider.name(),
                    kind,
                    OUTCOME_OK,
                    Some(response.latency),
                );
                metrics.record_usage(kind, &response.model, &response.usage);
            }
            Err(e) => {
                warn!(error = %e, "Upstream call failed");
                metrics.record_attempt(self.provider.name(), kind, e.kind.label(), None);
            }
        }

        result
    }
}
