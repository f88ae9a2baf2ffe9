//! Standalone retrying helpers.
//!
//! These run the same quota, provider and ledger path as [`Gateway`], but
//! retry transient failures with a doubling delay (up to
//! [`EXPONENTIAL_MAX_ATTEMPTS`] attempts) instead of the gateway's fixed
//! policy. Neither helper nests inside the gateway's own retries.

use crate::Gateway;
use tollgate_core::ChatMessage;
use tollgate_error::TollgateResult;
use tollgate_rate_limit::{BackoffRetrier, EXPONENTIAL_MAX_ATTEMPTS};

/// Vector width assumed for models not listed below.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Run a completion with exponential backoff and return only its text.
///
/// # Errors
///
/// Returns a quota error immediately, or the provider error from the final
/// attempt.
pub async fn complete_with_retry(
    gateway: &Gateway,
    messages: Vec<ChatMessage>,
    model: Option<&str>,
) -> TollgateResult<String> {
    let retrier = exponential_retrier(gateway);
    let completion = gateway
        .complete_using(&retrier, messages, model, None, None)
        .await?;
    Ok(completion.content)
}

/// Embed a batch with exponential backoff.
///
/// # Errors
///
/// Same as [`complete_with_retry`].
pub async fn embed_batch_with_retry(
    gateway: &Gateway,
    texts: &[String],
) -> TollgateResult<Vec<Vec<f32>>> {
    let retrier = exponential_retrier(gateway);
    gateway.embed_batch_using(&retrier, texts).await
}

/// Vector width produced by an embedding model.
///
/// ```
/// assert_eq!(tollgate::embedding_dimensions("text-embedding-3-large"), 3072);
/// assert_eq!(tollgate::embedding_dimensions("something-new"), 1536);
/// ```
pub fn embedding_dimensions(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        "text-embedding-ada-002" | "text-embedding-3-small" => 1536,
        _ => DEFAULT_EMBEDDING_DIMENSIONS,
    }
}

fn exponential_retrier(gateway: &Gateway) -> BackoffRetrier {
    let policy = gateway.config().retry.exponential_policy();
    debug_assert_eq!(policy.max_attempts(), EXPONENTIAL_MAX_ATTEMPTS);
    BackoffRetrier::new(policy)
}
