//! GLM embeddings implementation.
//!
//! Talks to a GLM-style `/embeddings` endpoint over HTTP. Rate-limit
//! responses are retried with exponential backoff; every other failure
//! propagates immediately.

use super::retry::{self, CallError};
use super::{CredentialProvider, Embedder, EnvCredential};
use crate::config::EmbeddingSettings;
use crate::error::{HenteError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// GLM-based embedder.
pub struct GlmEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    credential: Arc<dyn CredentialProvider>,
    batch_size: usize,
    max_retries: u32,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u64,
}

impl GlmEmbedder {
    /// Create an embedder from settings, reading the credential from the
    /// configured environment variables on each call.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        Self::with_credential(
            settings,
            Arc::new(EnvCredential::new(settings.api_key_env.clone())),
        )
    }

    /// Create an embedder with a custom credential source.
    pub fn with_credential(
        settings: &EmbeddingSettings,
        credential: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            credential,
            batch_size: settings.batch_size,
            max_retries: settings.max_retries,
        })
    }

    async fn request(
        &self,
        texts: &[String],
        api_key: &str,
    ) -> std::result::Result<Vec<Vec<f32>>, CallError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CallError::Fatal(HenteError::Http(e)))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), retry_after, &text));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| CallError::Fatal(HenteError::Format(e.to_string())))?;

        if let Some(usage) = &parsed.usage {
            debug!("Embedding usage: {} tokens", usage.total_tokens);
        }

        embeddings_in_order(parsed.data, texts.len()).map_err(CallError::Fatal)
    }
}

/// Extract the provider's retry-after hint, if any, as whole seconds.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Map a non-success HTTP status to the retry driver's error taxonomy.
///
/// Only 429 is retried; a rejected credential is a configuration error and
/// everything else is a hard embedding failure.
fn classify_failure(status: u16, retry_after: Option<Duration>, body: &str) -> CallError {
    match status {
        429 => CallError::RateLimited { retry_after },
        401 | 403 => CallError::Fatal(HenteError::Config(format!(
            "embedding provider rejected credential ({})",
            status
        ))),
        _ => CallError::Fatal(HenteError::Embedding(format!(
            "provider returned {}: {}",
            status, body
        ))),
    }
}

/// Check the item count against the input and restore input order.
///
/// Providers return vectors in input order, but re-sort by index to keep
/// the chunk/embedding correspondence safe. A count mismatch means an
/// incompatible provider contract and is never retried.
fn embeddings_in_order(
    mut data: Vec<EmbeddingData>,
    expected: usize,
) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(HenteError::Format(format!(
            "expected {} embeddings, provider returned {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl Embedder for GlmEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| HenteError::Format("empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.len() > self.batch_size {
            return Err(HenteError::InvalidInput(format!(
                "batch of {} texts exceeds the provider limit of {}",
                texts.len(),
                self.batch_size
            )));
        }

        // Resolved per call so rotated credentials apply without a restart.
        let api_key = self.credential.resolve().ok_or_else(|| {
            HenteError::Config(
                "no embedding API key set; export GLM_API_KEY or ZHIPU_API_KEY".to_string(),
            )
        })?;

        debug!("Generating embeddings for {} texts", texts.len());
        retry::with_backoff(self.max_retries, || self.request(texts, &api_key)).await
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::StaticCredential;

    fn embedder_with_key(key: Option<&str>) -> GlmEmbedder {
        GlmEmbedder::with_credential(
            &EmbeddingSettings::default(),
            Arc::new(StaticCredential(key.map(str::to_string))),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn missing_credential_is_a_config_error() {
        let embedder = embedder_with_key(None);
        let err = embedder.embed("hello").await.unwrap_err();
        assert!(matches!(err, HenteError::Config(_)));
    }

    #[tokio::test]
    async fn oversized_batch_is_rejected_before_any_call() {
        let embedder = embedder_with_key(None);
        let texts: Vec<String> = (0..33).map(|i| format!("text {}", i)).collect();
        // Batch-size check fires before credential resolution.
        let err = embedder.embed_batch(&texts).await.unwrap_err();
        assert!(matches!(err, HenteError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn empty_batch_short_circuits() {
        let embedder = embedder_with_key(None);
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn response_shape_parses() {
        let parsed: EmbeddingResponse = serde_json::from_str(
            r#"{"data":[{"index":1,"embedding":[0.5]},{"index":0,"embedding":[1.0]}],
                "usage":{"total_tokens":12}}"#,
        )
        .unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.usage.unwrap().total_tokens, 12);
    }

    #[test]
    fn rate_limit_status_is_retried_with_header_hint() {
        let hint = Some(Duration::from_secs(5));
        match classify_failure(429, hint, "") {
            CallError::RateLimited { retry_after } => assert_eq!(retry_after, hint),
            CallError::Fatal(_) => panic!("429 must map to a retryable error"),
        }
        match classify_failure(429, None, "slow down") {
            CallError::RateLimited { retry_after } => assert_eq!(retry_after, None),
            CallError::Fatal(_) => panic!("429 must map to a retryable error"),
        }
    }

    #[test]
    fn rejected_credential_is_a_config_error() {
        for status in [401, 403] {
            match classify_failure(status, None, "unauthorized") {
                CallError::Fatal(HenteError::Config(_)) => {}
                _ => panic!("{} must map to a fatal config error", status),
            }
        }
    }

    #[test]
    fn other_statuses_are_hard_failures() {
        match classify_failure(500, None, "boom") {
            CallError::Fatal(HenteError::Embedding(msg)) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            _ => panic!("500 must map to a fatal embedding error"),
        }
    }

    #[test]
    fn retry_after_header_parses_whole_seconds() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "7".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(7)));

        headers.insert(reqwest::header::RETRY_AFTER, "soon".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), None);
        assert_eq!(parse_retry_after(&reqwest::header::HeaderMap::new()), None);
    }

    #[test]
    fn embedding_count_mismatch_is_a_format_error() {
        let data = vec![EmbeddingData {
            index: 0,
            embedding: vec![1.0],
        }];
        let err = embeddings_in_order(data, 2).unwrap_err();
        assert!(matches!(err, HenteError::Format(_)));
    }

    #[test]
    fn embeddings_are_restored_to_input_order() {
        let data = vec![
            EmbeddingData {
                index: 1,
                embedding: vec![0.5],
            },
            EmbeddingData {
                index: 0,
                embedding: vec![1.0],
            },
        ];
        let ordered = embeddings_in_order(data, 2).unwrap();
        assert_eq!(ordered, vec![vec![1.0], vec![0.5]]);
    }
}
