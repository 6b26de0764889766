//! Hosted translation implementation (Hugging Face Inference API).

use super::Translator;
use crate::error::{AgnError, Result};
use crate::inference::InferenceClient;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Translator backed by a hosted sequence-to-sequence model.
pub struct HfTranslator {
    client: Arc<InferenceClient>,
    model: String,
    beam_width: u32,
    max_length: u32,
}

impl HfTranslator {
    /// Create a translator with decoding parameters.
    pub fn new(client: Arc<InferenceClient>, model: &str, beam_width: u32, max_length: u32) -> Self {
        Self {
            client,
            model: model.to_string(),
            beam_width,
            max_length,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranslationResult {
    translation_text: String,
}

#[async_trait]
impl Translator for HfTranslator {
    #[instrument(skip(self, text))]
    async fn translate(&self, text: &str) -> Result<String> {
        let body = serde_json::json!({
            "inputs": text,
            "parameters": {
                "max_length": self.max_length,
                "num_beams": self.beam_width,
            },
            "options": { "wait_for_model": true },
        });

        let response = self.client.post(&self.model, &body).await?;

        let results: Vec<TranslationResult> = serde_json::from_value(response)
            .map_err(|e| AgnError::Translation(format!("Unexpected response shape: {}", e)))?;

        results
            .into_iter()
            .next()
            .map(|r| r.translation_text)
            .ok_or_else(|| {
                AgnError::Translation(format!("Model {} returned no translation", self.model))
            })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_result_parsing() {
        let json = serde_json::json!([{"translation_text": "Hello world"}]);
        let results: Vec<TranslationResult> = serde_json::from_value(json).unwrap();
        assert_eq!(results[0].translation_text, "Hello world");
    }
}
