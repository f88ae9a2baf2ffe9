//! Tests for the gateway call path: quota, retry, reconciliation and
//! accounting.

use anyhow::Result;
use async_trait::async_trait;
use httpmock::{Method::POST, MockServer};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tollgate::{
    ChatMessage, CompletionRequest, Credentials, EmbeddingInput, EmbeddingRequest, Gateway,
    GatewayConfig, ManualClock, NormalizedResponse, Provider, ProviderError, ProviderErrorKind,
    ProviderKind, ProviderRequest, ProviderRouter, ProviderSettings, QuotaConfig,
    ResponseOutput, Sentiment, Usage, complete_with_retry, embed_batch_with_retry,
};
use tollgate_error::ProviderResult;

type Responder = Box<dyn Fn(u32, &ProviderRequest) -> ProviderResult<NormalizedResponse> + Send + Sync>;

/// Provider that answers from a closure and records what it was asked.
struct ScriptedProvider {
    calls: AtomicU32,
    requests: Mutex<Vec<ProviderRequest>>,
    respond: Responder,
}

impl std::fmt::Debug for ScriptedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedProvider")
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

impl ScriptedProvider {
    fn new(
        respond: impl Fn(u32, &ProviderRequest) -> ProviderResult<NormalizedResponse>
        + Send
        + Sync
        + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> ProviderRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }

    fn answer(&self, request: ProviderRequest) -> ProviderResult<NormalizedResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let result = (self.respond)(n, &request);
        self.requests.lock().unwrap().push(request);
        result
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<NormalizedResponse> {
        self.answer(request.clone().into())
    }

    async fn embed(&self, request: &EmbeddingRequest) -> ProviderResult<NormalizedResponse> {
        self.answer(request.clone().into())
    }
}

fn content(text: &str, model: &str, usage: Usage) -> ProviderResult<NormalizedResponse> {
    Ok(NormalizedResponse {
        output: ResponseOutput::Content(text.to_string()),
        model: model.to_string(),
        usage,
        latency: Duration::from_millis(100),
    })
}

fn vectors(count: usize, total_tokens: u64) -> ProviderResult<NormalizedResponse> {
    Ok(NormalizedResponse {
        output: ResponseOutput::Vectors(vec![vec![0.5, -0.5]; count]),
        model: "text-embedding-ada-002".to_string(),
        usage: Usage::new(total_tokens, 0, total_tokens),
        latency: Duration::from_millis(20),
    })
}

fn overloaded() -> ProviderError {
    ProviderError::new(ProviderErrorKind::Api {
        status: 503,
        message: "overloaded".to_string(),
    })
}

fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.retry.delay_secs = 0.0;
    config.retry.exponential_initial_secs = 0.0;
    config
}

fn gateway(config: GatewayConfig, provider: Arc<ScriptedProvider>) -> Gateway {
    Gateway::with_router(
        config,
        ProviderRouter::from_provider(provider),
        Arc::new(ManualClock::new()),
    )
    .unwrap()
}

fn hello() -> Vec<ChatMessage> {
    vec![ChatMessage::user("Hello")]
}

#[tokio::test]
async fn test_success_is_reconciled_and_recorded() -> Result<()> {
    let provider = ScriptedProvider::new(|_, _| content("Hi!", "gpt-4-0613", Usage::new(10, 5, 15)));
    let gateway = gateway(test_config(), provider.clone());

    let completion = gateway
        .complete(hello(), Some("gpt-4"), None, Some(32))
        .await?;

    assert_eq!(completion.content, "Hi!");
    assert_eq!(completion.model, "gpt-4-0613");
    assert_eq!(completion.usage.total_tokens, 15);
    assert_eq!(provider.calls(), 1);

    // Completions reserve zero tokens and charge actual usage afterwards.
    let quota = gateway.quota().status();
    assert_eq!(quota.requests_in_window, 1);
    assert_eq!(quota.tokens_in_window, 15);

    // Priced under the requested model: 10 in at 0.03/1k, 5 out at 0.06/1k.
    let today = gateway.ledger().daily_summary(None);
    assert_eq!(*today.requests(), 1);
    assert_eq!(*today.total_tokens(), 15);
    assert!((today.total_cost() - 0.0006).abs() < 1e-12);
    assert!(today.model("gpt-4").is_some());

    let status = gateway.status();
    assert_eq!(status.success_count, 1);
    assert_eq!(status.failure_count, 0);
    assert_eq!(status.provider, "scripted");
    Ok(())
}

#[tokio::test]
async fn test_defaults_fill_unset_arguments() -> Result<()> {
    let provider = ScriptedProvider::new(|_, _| content("ok", "m", Usage::new(1, 1, 2)));
    let gateway = gateway(test_config(), provider.clone());

    gateway.complete(hello(), None, Some(0.0), None).await?;

    let ProviderRequest::Completion(request) = provider.last_request() else {
        panic!("expected a completion request");
    };
    assert_eq!(request.model, "gpt-4-turbo-preview");
    assert_eq!(request.temperature, 0.0);
    assert_eq!(request.max_tokens, 2000);
    Ok(())
}

#[tokio::test]
async fn test_requests_per_minute_denial_skips_provider() {
    let provider = ScriptedProvider::new(|_, _| content("ok", "m", Usage::default()));
    let mut config = test_config();
    config.quota = QuotaConfig::new(1, 1_000_000);
    let gateway = gateway(config, provider.clone());

    gateway.complete(hello(), None, None, None).await.unwrap();
    let err = gateway.complete(hello(), None, None, None).await.unwrap_err();

    assert!(err.is_quota_exceeded());
    assert!(err.as_quota().unwrap().is_requests_per_minute());
    assert_eq!(provider.calls(), 1);

    let status = gateway.status();
    assert_eq!(status.success_count, 1);
    assert_eq!(status.failure_count, 1);
    assert!(status.last_error.is_some());
    assert_eq!(*status.today.requests(), 1);
}

#[tokio::test]
async fn test_tokens_per_minute_denial_skips_provider() {
    let provider = ScriptedProvider::new(|_, _| vectors(1, 10));
    let mut config = test_config();
    config.quota = QuotaConfig::new(60, 5);
    let gateway = gateway(config, provider.clone());

    // 40 characters estimate to 10 tokens, over the 5-token budget.
    let err = gateway.embed(&"x".repeat(40)).await.unwrap_err();

    assert!(err.as_quota().unwrap().is_tokens_per_minute());
    assert_eq!(provider.calls(), 0);
    assert_eq!(gateway.quota().status().requests_in_window, 0);
}

#[tokio::test]
async fn test_completion_overshoot_blocks_next_completion() {
    let provider = ScriptedProvider::new(|_, _| content("long", "m", Usage::new(5, 10, 15)));
    let mut config = test_config();
    config.quota = QuotaConfig::new(60, 10);
    let gateway = gateway(config, provider.clone());

    gateway.complete(hello(), None, None, None).await.unwrap();
    assert_eq!(gateway.quota().status().tokens_in_window, 15);

    // The window is over budget, so even a zero-token reservation is denied.
    let err = gateway.complete(hello(), None, None, None).await.unwrap_err();
    assert!(err.as_quota().unwrap().is_tokens_per_minute());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_embedding_estimate_counts_characters() -> Result<()> {
    let provider = ScriptedProvider::new(|_, _| {
        Ok(NormalizedResponse {
            output: ResponseOutput::Vector(vec![0.0]),
            model: "text-embedding-ada-002".to_string(),
            usage: Usage::new(1, 0, 1),
            latency: Duration::from_millis(5),
        })
    });
    let mut config = test_config();
    config.quota = QuotaConfig::new(60, 2);
    let gateway = gateway(config, provider.clone());

    // Eight characters but twelve bytes: estimates to 2 tokens, not 3.
    let text = "ééééeeee";
    assert_eq!(tollgate::estimate_tokens(text), 2);
    gateway.embed(text).await?;

    assert_eq!(provider.calls(), 1);
    assert_eq!(gateway.quota().status().tokens_in_window, 2);
    Ok(())
}

#[tokio::test]
async fn test_exhausted_retries_return_last_error_without_recording() {
    let provider = ScriptedProvider::new(|_, _| Err(overloaded()));
    let gateway = gateway(test_config(), provider.clone());

    let err = gateway.complete(hello(), None, None, None).await.unwrap_err();

    assert!(err.is_provider_failure());
    assert!(matches!(
        err.as_provider().unwrap().kind,
        ProviderErrorKind::Api { status: 503, .. }
    ));
    assert_eq!(provider.calls(), 3);

    // The reservation stands; nothing is charged to the ledger.
    assert_eq!(gateway.quota().status().requests_in_window, 1);
    assert_eq!(*gateway.ledger().lifetime_summary().total_requests(), 0);
    assert_eq!(gateway.status().failure_count, 1);
}

#[tokio::test]
async fn test_transient_failures_then_success() -> Result<()> {
    let provider = ScriptedProvider::new(|n, _| {
        if n < 3 {
            Err(overloaded())
        } else {
            content("third time", "m", Usage::new(3, 2, 5))
        }
    });
    let gateway = gateway(test_config(), provider.clone());

    let completion = gateway.complete(hello(), None, None, None).await?;

    assert_eq!(completion.content, "third time");
    assert_eq!(provider.calls(), 3);
    assert_eq!(gateway.quota().status().requests_in_window, 1);
    assert_eq!(*gateway.ledger().lifetime_summary().total_requests(), 1);
    Ok(())
}

#[tokio::test]
async fn test_permanent_failure_is_not_retried() {
    let provider = ScriptedProvider::new(|_, _| {
        Err(ProviderError::new(ProviderErrorKind::Api {
            status: 401,
            message: "invalid key".to_string(),
        }))
    });
    let gateway = gateway(test_config(), provider.clone());

    assert!(gateway.complete(hello(), None, None, None).await.is_err());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_embed_batch_reserves_estimate_and_reconciles() -> Result<()> {
    let provider = ScriptedProvider::new(|_, _| vectors(2, 7));
    let gateway = gateway(test_config(), provider.clone());
    let texts = vec!["abcdefgh".to_string(), "hi".to_string()];

    let result = gateway.embed_batch(&texts).await?;

    assert_eq!(result.len(), 2);
    assert_eq!(provider.calls(), 1);
    let ProviderRequest::Embedding(request) = provider.last_request() else {
        panic!("expected an embedding request");
    };
    assert_eq!(request.input, EmbeddingInput::Batch(texts));
    assert_eq!(request.model, "text-embedding-ada-002");

    // Estimate 2 + 1, reconciled up to the reported 7.
    assert_eq!(gateway.quota().status().tokens_in_window, 7);
    Ok(())
}

#[tokio::test]
async fn test_embed_batch_overestimate_is_not_refunded() -> Result<()> {
    let provider = ScriptedProvider::new(|_, _| vectors(1, 1));
    let gateway = gateway(test_config(), provider.clone());

    gateway.embed_batch(&["x".repeat(400)]).await?;

    assert_eq!(gateway.quota().status().tokens_in_window, 100);
    Ok(())
}

#[tokio::test]
async fn test_empty_batch_never_reaches_provider() -> Result<()> {
    let provider = ScriptedProvider::new(|_, _| vectors(0, 0));
    let gateway = gateway(test_config(), provider.clone());

    assert!(gateway.embed_batch(&[]).await?.is_empty());
    assert_eq!(provider.calls(), 0);
    assert_eq!(gateway.quota().status().requests_in_window, 0);
    Ok(())
}

#[tokio::test]
async fn test_single_embedding_returns_one_vector() -> Result<()> {
    let provider = ScriptedProvider::new(|_, _| {
        Ok(NormalizedResponse {
            output: ResponseOutput::Vector(vec![1.0, 2.0, 3.0]),
            model: "text-embedding-ada-002".to_string(),
            usage: Usage::new(2, 0, 2),
            latency: Duration::from_millis(5),
        })
    });
    let gateway = gateway(test_config(), provider.clone());

    assert_eq!(gateway.embed("hello").await?, vec![1.0, 2.0, 3.0]);
    Ok(())
}

#[tokio::test]
async fn test_classify_sentiment_uses_profile_and_one_token() {
    let provider = ScriptedProvider::new(|_, _| content("Positive", "m", Usage::new(30, 1, 31)));
    let mut config = test_config();
    config.models.profiles.insert(
        "sentiment".to_string(),
        tollgate::RequestProfile {
            model: Some("gpt-3.5-turbo".to_string()),
            temperature: Some(0.5),
        },
    );
    let gateway = gateway(config, provider.clone());

    assert_eq!(
        gateway.classify_sentiment("I love this").await,
        Sentiment::Positive
    );

    let ProviderRequest::Completion(request) = provider.last_request() else {
        panic!("expected a completion request");
    };
    assert_eq!(request.model, "gpt-3.5-turbo");
    assert_eq!(request.temperature, 0.0);
    assert_eq!(request.max_tokens, 1);
    assert!(request.messages[0].content.ends_with("Text: I love this"));
}

#[tokio::test]
async fn test_classify_sentiment_failure_is_neutral() {
    let provider = ScriptedProvider::new(|_, _| Err(overloaded()));
    let gateway = gateway(test_config(), provider.clone());

    assert_eq!(gateway.classify_sentiment("meh").await, Sentiment::Neutral);
    assert_eq!(gateway.status().failure_count, 1);
}

#[tokio::test]
async fn test_complete_with_profile_applies_overrides() -> Result<()> {
    let provider = ScriptedProvider::new(|_, _| content("ok", "m", Usage::new(1, 1, 2)));
    let mut config = test_config();
    config.models.profiles.insert(
        "technical".to_string(),
        tollgate::RequestProfile {
            model: Some("gpt-4".to_string()),
            temperature: Some(0.3),
        },
    );
    let gateway = gateway(config, provider.clone());

    gateway.complete_with_profile("technical", hello(), None).await?;
    let ProviderRequest::Completion(request) = provider.last_request() else {
        panic!("expected a completion request");
    };
    assert_eq!(request.model, "gpt-4");
    assert_eq!(request.temperature, 0.3);

    gateway.complete_with_profile("unknown", hello(), None).await?;
    let ProviderRequest::Completion(request) = provider.last_request() else {
        panic!("expected a completion request");
    };
    assert_eq!(request.model, "gpt-4-turbo-preview");
    assert_eq!(request.temperature, 0.7);
    Ok(())
}

#[tokio::test]
async fn test_disabled_ledger_skips_recording() -> Result<()> {
    let provider = ScriptedProvider::new(|_, _| content("ok", "gpt-4", Usage::new(10, 10, 20)));
    let mut config = test_config();
    config.ledger.enabled = false;
    let gateway = gateway(config, provider.clone());

    gateway.complete(hello(), None, None, None).await?;

    assert_eq!(*gateway.ledger().lifetime_summary().total_requests(), 0);
    assert_eq!(gateway.status().success_count, 1);
    assert_eq!(gateway.quota().status().tokens_in_window, 20);
    Ok(())
}

#[tokio::test]
async fn test_retry_helpers_use_exponential_budget() -> Result<()> {
    let provider = ScriptedProvider::new(|n, request| match request {
        ProviderRequest::Completion(_) if n >= 4 => content("finally", "m", Usage::new(1, 1, 2)),
        _ => Err(overloaded()),
    });
    let gateway = gateway(test_config(), provider.clone());

    // Four attempts exceed the gateway's fixed budget of three.
    let text = complete_with_retry(&gateway, hello(), Some("gpt-4")).await?;
    assert_eq!(text, "finally");
    assert_eq!(provider.calls(), 4);

    let err = embed_batch_with_retry(&gateway, &["a".to_string()])
        .await
        .unwrap_err();
    assert!(err.is_provider_failure());
    assert_eq!(provider.calls(), 4 + 5);
    Ok(())
}

#[tokio::test]
async fn test_status_serializes() -> Result<()> {
    let provider = ScriptedProvider::new(|_, _| content("ok", "gpt-4", Usage::new(1, 1, 2)));
    let gateway = gateway(test_config(), provider);

    gateway.complete(hello(), Some("gpt-4"), None, None).await?;

    let value = serde_json::to_value(gateway.status())?;
    assert_eq!(value["provider"], "scripted");
    assert_eq!(value["success_count"], 1);
    assert_eq!(value["quota"]["requests_in_window"], 1);
    assert_eq!(value["today"]["requests"], 1);
    Ok(())
}

#[tokio::test]
async fn test_gateway_over_http() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .body_includes("\"max_tokens\":8");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    json!({
                        "model": "gpt-3.5-turbo-0125",
                        "choices": [
                            {"index": 0, "message": {"role": "assistant", "content": "Pong"}}
                        ],
                        "usage": {"prompt_tokens": 1000, "completion_tokens": 1000, "total_tokens": 2000}
                    })
                    .to_string(),
                );
        })
        .await;

    let mut config = test_config();
    config.provider = ProviderSettings::new(ProviderKind::Primary).with_base_url(server.url("/v1"));
    let gateway = Gateway::new(config, &Credentials::default().with_openai_key("sk-test"))?;

    let completion = gateway
        .complete(hello(), Some("gpt-3.5-turbo"), None, Some(8))
        .await?;
    mock.assert_async().await;

    assert_eq!(completion.content, "Pong");
    let today = gateway.ledger().daily_summary(None);
    // 1000 in at 0.0005/1k plus 1000 out at 0.0015/1k.
    assert!((today.total_cost() - 0.002).abs() < 1e-12);
    assert_eq!(*today.total_tokens(), 2000);
    Ok(())
}

#[tokio::test]
async fn test_gateway_retries_over_http() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(500).body("{\"error\":{\"message\":\"boom\"}}");
        })
        .await;

    let mut config = test_config();
    config.provider = ProviderSettings::new(ProviderKind::Primary).with_base_url(server.url("/v1"));
    let gateway = Gateway::new(config, &Credentials::default().with_openai_key("sk-test")).unwrap();

    let err = gateway.embed("hello").await.unwrap_err();

    assert!(err.is_provider_failure());
    mock.assert_calls_async(3).await;
    assert_eq!(*gateway.ledger().lifetime_summary().total_requests(), 0);
}

#[test]
fn test_missing_api_key_refuses_to_start() {
    let err = Gateway::new(GatewayConfig::default(), &Credentials::default()).unwrap_err();
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}
