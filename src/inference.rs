//! Hugging Face Inference API client shared by the classification and
//! translation layers.

use crate::error::{AgnError, Result};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default endpoint for the hosted inference API.
const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models/";

/// Default timeout for inference requests (2 minutes; cold models can be slow).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Thin client for the hosted inference API.
///
/// Holds the HTTP client and bearer token; read-only after construction.
pub struct InferenceClient {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl InferenceClient {
    /// Create a client for the default endpoint, reading the API token from
    /// the `HF_API_TOKEN` environment variable if present.
    pub fn from_env() -> Result<Self> {
        Self::new(DEFAULT_ENDPOINT, std::env::var("HF_API_TOKEN").ok())
    }

    /// Create a client for a custom endpoint.
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AgnError::Config(format!("Invalid inference endpoint: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    /// POST a JSON body to a model and return the parsed JSON response.
    pub async fn post(&self, model: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let url = self
            .endpoint
            .join(model)
            .map_err(|e| AgnError::Config(format!("Invalid model id '{}': {}", model, e)))?;

        debug!("Inference request to {}", model);

        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgnError::Inference(format!(
                "{} returned {}: {}",
                model, status, text
            )));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_endpoint_join() {
        let client = InferenceClient::new(DEFAULT_ENDPOINT, None).unwrap();
        let url = client
            .endpoint
            .join("Helsinki-NLP/opus-mt-es-en")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api-inference.huggingface.co/models/Helsinki-NLP/opus-mt-es-en"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(InferenceClient::new("not a url", None).is_err());
    }
}
