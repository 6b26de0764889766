//! Hosted classifier implementation (Hugging Face Inference API).

use super::{Classifier, Verdict};
use crate::error::{AgnError, Result};
use crate::inference::InferenceClient;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Classifier backed by a hosted sequence-classification model.
pub struct HfClassifier {
    client: Arc<InferenceClient>,
    model: String,
    phishing_label: String,
}

impl HfClassifier {
    /// Create a classifier for a model, naming the label it emits for
    /// phishing (models disagree: `"phishing"` vs `"LABEL_1"`).
    pub fn new(client: Arc<InferenceClient>, model: &str, phishing_label: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            phishing_label: phishing_label.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[async_trait]
impl Classifier for HfClassifier {
    #[instrument(skip(self, text))]
    async fn classify(&self, text: &str) -> Result<Verdict> {
        let body = serde_json::json!({
            "inputs": text,
            "options": { "wait_for_model": true },
        });

        let response = self.client.post(&self.model, &body).await?;

        // The API nests scores one level deep for single inputs.
        let scores: Vec<Vec<LabelScore>> = serde_json::from_value(response)
            .map_err(|e| AgnError::Classifier(format!("Unexpected response shape: {}", e)))?;

        let best = scores
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| {
                AgnError::Classifier(format!("Model {} returned no scores", self.model))
            })?;

        debug!(
            "Model {} predicted '{}' at {:.3}",
            self.model, best.label, best.score
        );

        Ok(Verdict {
            phishing: best.label == self.phishing_label,
            confidence: best.score,
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
    fn test_label_score_parsing() {
        let json = serde_json::json!([[
            {"label": "benign", "score": 0.12},
            {"label": "phishing", "score": 0.88}
        ]]);
        let scores: Vec<Vec<LabelScore>> = serde_json::from_value(json).unwrap();
        assert_eq!(scores[0].len(), 2);
        assert_eq!(scores[0][1].label, "phishing");
    }
}
