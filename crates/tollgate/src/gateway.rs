//! The gateway façade.

use crate::{GatewayConfig, GatewayMetrics, Sentiment};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tollgate_core::{
    ChatMessage, Clock, Completion, CompletionRequest, EmbeddingInput, EmbeddingRequest,
    NormalizedResponse, ProviderRequest, ResponseOutput, SystemClock,
};
use tollgate_error::{ProviderError, ProviderErrorKind, TollgateResult};
use tollgate_ledger::{DailyUsage, UsageLedger};
use tollgate_models::{Credentials, ProviderRouter};
use tollgate_rate_limit::{BackoffRetrier, QuotaStatus, QuotaTracker};
use tracing::{debug, error, info, instrument, warn};

const SENTIMENT_PROFILE: &str = "sentiment";

/// Rough token count of `text` used to reserve embedding quota up front:
/// one token per four characters, at least one.
///
/// ```
/// assert_eq!(tollgate::estimate_tokens(""), 1);
/// assert_eq!(tollgate::estimate_tokens("abcdefgh"), 2);
/// ```
pub fn estimate_tokens(text: &str) -> u64 {
    ((text.chars().count() / 4) as u64).max(1)
}

#[derive(Debug, Default)]
struct Health {
    success_count: u64,
    failure_count: u64,
    last_error: Option<String>,
}

/// Health snapshot for status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayStatus {
    /// Provider serving calls
    pub provider: String,
    /// Calls that returned a result
    pub success_count: u64,
    /// Calls that were denied or failed
    pub failure_count: u64,
    /// Message of the most recent failure
    pub last_error: Option<String>,
    /// Current quota window
    pub quota: QuotaStatus,
    /// Usage recorded today
    pub today: DailyUsage,
}

/// Quota-enforcing, retrying, cost-tracking front door for LLM calls.
///
/// Every call follows the same path: reserve quota, run the provider call
/// under the retry policy, then charge any usage above the estimate back
/// into the quota window and record the call in the usage ledger. Denied
/// calls never reach the provider; failed calls never reach the ledger.
///
/// A gateway is `Send + Sync`; share one behind an `Arc`.
///
/// # Example
///
/// ```no_run
/// use tollgate::{ChatMessage, Gateway};
///
/// # async fn run() -> tollgate::TollgateResult<()> {
/// let gateway = Gateway::from_env()?;
/// let completion = gateway
///     .complete(vec![ChatMessage::user("Say hi")], None, None, Some(16))
///     .await?;
/// println!("{} ({} tokens)", completion.content, completion.usage.total_tokens);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Gateway {
    config: GatewayConfig,
    quota: QuotaTracker,
    retrier: BackoffRetrier,
    router: ProviderRouter,
    ledger: UsageLedger,
    health: Mutex<Health>,
}

impl Gateway {
    /// Build a gateway on the system clock.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `config` is invalid or the
    /// selected provider has no API key.
    pub fn new(config: GatewayConfig, credentials: &Credentials) -> TollgateResult<Self> {
        config.validate()?;
        let router = ProviderRouter::new(&config.provider, credentials)?;
        Ok(Self::assemble(config, router, Arc::new(SystemClock)))
    }

    /// Build a gateway from layered configuration and environment
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when loading or validation fails.
    pub fn from_env() -> TollgateResult<Self> {
        Self::new(GatewayConfig::load()?, &Credentials::from_env())
    }

    /// Build a gateway around an existing router and clock.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `config` is invalid.
    pub fn with_router(
        config: GatewayConfig,
        router: ProviderRouter,
        clock: Arc<dyn Clock>,
    ) -> TollgateResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, router, clock))
    }

    fn assemble(config: GatewayConfig, router: ProviderRouter, clock: Arc<dyn Clock>) -> Self {
        info!(
            provider = router.provider_name(),
            rpm = config.quota.rpm,
            tpm = config.quota.tpm,
            max_attempts = config.retry.max_attempts,
            ledger = config.ledger.enabled,
            "Gateway initialized"
        );

        Self {
            quota: QuotaTracker::with_clock(config.quota, Arc::clone(&clock)),
            retrier: BackoffRetrier::new(config.retry.policy()),
            ledger: UsageLedger::with_clock(config.pricing.clone(), clock),
            router,
            config,
            health: Mutex::new(Health::default()),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The quota tracker guarding this gateway.
    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    /// The usage ledger recording this gateway's calls.
    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// Run a chat completion.
    ///
    /// Unset arguments take the configured defaults. An explicit
    /// temperature of `0.0` is sent as-is.
    ///
    /// # Errors
    ///
    /// Returns a quota error without contacting the provider when the window
    /// is full, or the provider error from the final attempt.
    #[instrument(skip(self, messages), fields(messages = messages.len()))]
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        model: Option<&str>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> TollgateResult<Completion> {
        self.complete_using(&self.retrier, messages, model, temperature, max_tokens)
            .await
    }

    /// Run a chat completion with a named profile's model and temperature.
    ///
    /// Unknown profiles use the configured defaults.
    ///
    /// # Errors
    ///
    /// Same as [`complete`](Self::complete).
    pub async fn complete_with_profile(
        &self,
        profile: &str,
        messages: Vec<ChatMessage>,
        max_tokens: Option<u32>,
    ) -> TollgateResult<Completion> {
        let (model, temperature) = self.config.models.resolve_profile(profile);
        debug!(profile, model, temperature, "Resolved request profile");
        self.complete(messages, Some(model), Some(temperature), max_tokens)
            .await
    }

    /// Embed one text with the configured embedding model.
    ///
    /// # Errors
    ///
    /// Same as [`complete`](Self::complete).
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn embed(&self, text: &str) -> TollgateResult<Vec<f32>> {
        let request = EmbeddingRequest::new(self.config.models.embedding_model.as_str(), text);
        let response = self
            .execute(request.into(), estimate_tokens(text), &self.retrier)
            .await?;

        match response.output {
            ResponseOutput::Vector(vector) => Ok(vector),
            ResponseOutput::Vectors(mut vectors) if vectors.len() == 1 => Ok(vectors.remove(0)),
            _ => Err(unexpected_output("embedding vector").into()),
        }
    }

    /// Embed several texts in one upstream call.
    ///
    /// Reserves the summed estimate once. An empty batch returns
    /// immediately without touching quota or the provider.
    ///
    /// # Errors
    ///
    /// Same as [`complete`](Self::complete).
    pub async fn embed_batch(&self, texts: &[String]) -> TollgateResult<Vec<Vec<f32>>> {
        self.embed_batch_using(&self.retrier, texts).await
    }

    /// Classify `text` as positive, negative or neutral.
    ///
    /// Uses a one-token completion at temperature zero with the
    /// `sentiment` profile's model. Never fails: denials, provider errors
    /// and unexpected replies all yield [`Sentiment::Neutral`].
    #[instrument(skip(self, text))]
    pub async fn classify_sentiment(&self, text: &str) -> Sentiment {
        let prompt = format!(
            "Classify the sentiment of the following text as strictly one of: \
             positive, negative, or neutral. Respond with only the single word label.\n\n\
             Text: {text}"
        );
        let (model, _) = self.config.models.resolve_profile(SENTIMENT_PROFILE);

        match self
            .complete(vec![ChatMessage::user(prompt)], Some(model), Some(0.0), Some(1))
            .await
        {
            Ok(completion) => Sentiment::from_label(&completion.content),
            Err(e) => {
                warn!(error = %e, "Sentiment analysis failed, defaulting to neutral");
                Sentiment::Neutral
            }
        }
    }

    /// Health snapshot: call counts, last error, quota window and today's
    /// usage.
    pub fn status(&self) -> GatewayStatus {
        let health = self.health();
        GatewayStatus {
            provider: self.router.provider_name().to_string(),
            success_count: health.success_count,
            failure_count: health.failure_count,
            last_error: health.last_error.clone(),
            quota: self.quota.status(),
            today: self.ledger.daily_summary(None),
        }
    }

    pub(crate) async fn complete_using(
        &self,
        retrier: &BackoffRetrier,
        messages: Vec<ChatMessage>,
        model: Option<&str>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> TollgateResult<Completion> {
        let defaults = &self.config.models;
        let request = CompletionRequest {
            model: model.unwrap_or(&defaults.default_model).to_string(),
            messages,
            temperature: temperature.unwrap_or(defaults.default_temperature),
            max_tokens: max_tokens.unwrap_or(defaults.default_max_tokens),
        };

        // Completions reserve a call only; tokens are charged on success.
        let response = self.execute(request.into(), 0, retrier).await?;

        match response.output {
            ResponseOutput::Content(content) => Ok(Completion {
                content,
                model: response.model,
                usage: response.usage,
                latency: response.latency,
            }),
            _ => Err(unexpected_output("completion content").into()),
        }
    }

    pub(crate) async fn embed_batch_using(
        &self,
        retrier: &BackoffRetrier,
        texts: &[String],
    ) -> TollgateResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let estimate = texts.iter().map(|t| estimate_tokens(t)).sum();
        let request = EmbeddingRequest::new(
            self.config.models.embedding_model.as_str(),
            EmbeddingInput::Batch(texts.to_vec()),
        );
        let response = self.execute(request.into(), estimate, retrier).await?;

        match response.output {
            ResponseOutput::Vectors(vectors) => Ok(vectors),
            ResponseOutput::Vector(vector) => Ok(vec![vector]),
            ResponseOutput::Content(_) => Err(unexpected_output("embedding vectors").into()),
        }
    }

    /// Quota check, retried provider call, then reconciliation and
    /// accounting.
    async fn execute(
        &self,
        request: ProviderRequest,
        estimate: u64,
        retrier: &BackoffRetrier,
    ) -> TollgateResult<NormalizedResponse> {
        let kind = request.kind();

        if let Err(denied) = self.quota.reserve(estimate) {
            let limit = if denied.is_requests_per_minute() {
                "rpm"
            } else {
                "tpm"
            };
            GatewayMetrics::get().record_denial(kind.as_ref(), limit);
            self.record_failure(&denied);
            return Err(denied.into());
        }

        let response = match retrier.run(|| self.router.call(&request)).await {
            Ok(response) => response,
            Err(e) => {
                error!(%kind, model = request.model(), error = %e, "Call failed");
                self.record_failure(&e);
                return Err(e.into());
            }
        };

        let usage = response.usage;
        if usage.total_tokens > estimate {
            self.quota.reconcile(usage.total_tokens - estimate);
        }

        let cost = if self.config.ledger.enabled {
            let cost = self.ledger.record(
                request.model(),
                usage.total_tokens,
                response.latency,
                Some(usage.prompt_tokens),
                Some(usage.completion_tokens),
            );
            GatewayMetrics::get().record_cost(request.model(), cost);
            Some(cost)
        } else {
            None
        };

        self.record_success();
        info!(
            %kind,
            model = %response.model,
            tokens = usage.total_tokens,
            cost = ?cost,
            latency_ms = response.latency.as_millis() as u64,
            "Call completed"
        );

        Ok(response)
    }

    fn health(&self) -> MutexGuard<'_, Health> {
        self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_success(&self) {
        self.health().success_count += 1;
    }

    fn record_failure(&self, error: &impl Display) {
        let mut health = self.health();
        health.failure_count += 1;
        health.last_error = Some(error.to_string());
    }
}

fn unexpected_output(expected: &str) -> ProviderError {
    ProviderError::new(ProviderErrorKind::Parse(format!(
        "provider returned no {expected}"
    )))
}
