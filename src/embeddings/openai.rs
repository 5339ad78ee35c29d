//! OpenAI-compatible embedding provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::EmbeddingProvider;
use crate::error::EmbeddingError;
use crate::Result;

const EMBEDDINGS_ENDPOINT: &str = "/v1/embeddings";

/// Provider backed by an OpenAI-compatible `/v1/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiProvider {
    /// Create a provider for the given endpoint and model.
    ///
    /// Every request carries `timeout_secs` as a hard deadline so an
    /// unresponsive endpoint cannot stall a sync run.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Transport(format!("failed to build client: {e}")))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            base_url,
            model: model.into(),
            timeout_secs,
        })
    }

    fn map_request_error(&self, e: &reqwest::Error) -> EmbeddingError {
        if e.is_timeout() {
            EmbeddingError::Timeout(self.timeout_secs)
        } else {
            EmbeddingError::Transport(e.to_string())
        }
    }

    async fn request(&self, input: serde_json::Value) -> Result<EmbeddingsResponse> {
        let payload = serde_json::json!({
            "input": input,
            "model": self.model,
            "encoding_format": "float",
        });

        let response = self
            .client
            .post(format!("{}{EMBEDDINGS_ENDPOINT}", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_request_error(&e))?
            .error_for_status()
            .map_err(|e| EmbeddingError::Transport(e.to_string()))?;

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;
        Ok(parsed)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let parsed = self.request(serde_json::json!(text)).await?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty data array".to_string()).into())
    }

    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let parsed = self.request(serde_json::json!(texts)).await?;
        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            ))
            .into());
        }
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = OpenAiProvider::new("http://localhost:8000/", "test-model", 10).unwrap();
        assert_eq!(provider.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"data": [{"embedding": [0.1, 0.2]}, {"embedding": [0.3, 0.4]}]}"#;
        let parsed: EmbeddingsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Reserved TEST-NET address, nothing listens there.
        let provider = OpenAiProvider::new("http://192.0.2.1:1", "test-model", 1).unwrap();
        let err = provider.encode("hello").await.unwrap_err();
        assert!(matches!(err, crate::Error::Embedding(_)));
    }
}
