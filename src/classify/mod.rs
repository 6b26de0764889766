//! Phishing classification for Agn.
//!
//! Wraps hosted text classifiers behind a trait, maps confidence to the
//! user-visible risk tiers, and implements the two-model comparison policy.

mod hf;

pub use hf::HfClassifier;

use crate::error::{AgnError, Result};
use crate::text::{preview, truncate_tokens, MAX_INPUT_TOKENS};
use async_trait::async_trait;

/// A single classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// True when the text was flagged as phishing.
    pub phishing: bool,
    /// Confidence for the predicted label, in [0, 1].
    pub confidence: f64,
}

impl Verdict {
    /// Confidence as a percentage, the unit the risk thresholds use.
    pub fn confidence_pct(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// Trait for phishing classifiers.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a text as phishing or benign.
    async fn classify(&self, text: &str) -> Result<Verdict>;

    /// Identifier of the underlying model, shown in reports.
    fn model_id(&self) -> &str;
}

/// Risk tier for a single-model verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    VeryHigh,
    High,
    Moderate,
    Low,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::VeryHigh => write!(f, "VERY HIGH"),
            RiskTier::High => write!(f, "HIGH"),
            RiskTier::Moderate => write!(f, "MODERATE"),
            RiskTier::Low => write!(f, "LOW"),
        }
    }
}

/// Map a verdict to its risk tier.
///
/// Flagged: >= 90% is VERY HIGH, >= 70% is HIGH, anything lower MODERATE.
/// Not flagged is always LOW. These thresholds are user-visible contract.
pub fn risk_tier(verdict: &Verdict) -> RiskTier {
    if verdict.phishing {
        let pct = verdict.confidence_pct();
        if pct >= 90.0 {
            RiskTier::VeryHigh
        } else if pct >= 70.0 {
            RiskTier::High
        } else {
            RiskTier::Moderate
        }
    } else {
        RiskTier::Low
    }
}

/// Combined risk level from the two-model comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinedRisk {
    Critical,
    High,
    Moderate,
    Low,
    Uncertain,
}

impl std::fmt::Display for CombinedRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CombinedRisk::Critical => write!(f, "CRITICAL"),
            CombinedRisk::High => write!(f, "HIGH"),
            CombinedRisk::Moderate => write!(f, "MODERATE"),
            CombinedRisk::Low => write!(f, "LOW"),
            CombinedRisk::Uncertain => write!(f, "UNCERTAIN"),
        }
    }
}

impl CombinedRisk {
    /// Advisory line shown next to the combined level.
    pub fn recommendation(&self) -> &'static str {
        match self {
            CombinedRisk::Critical => "Both models detect phishing with high confidence",
            CombinedRisk::High => "Both models detect phishing",
            CombinedRisk::Moderate => "The models disagree, review manually",
            CombinedRisk::Low => "Both models classify the text as benign",
            CombinedRisk::Uncertain => "Low confidence in both models, review manually",
        }
    }
}

/// Combine two verdicts into a final risk level.
///
/// Both flag: CRITICAL when both confidences are >= 70%, otherwise HIGH.
/// Both clear: LOW when both are >= 70%, otherwise UNCERTAIN.
/// Any disagreement: MODERATE, regardless of confidence.
pub fn combined_risk(primary: &Verdict, secondary: &Verdict) -> CombinedRisk {
    let both_confident = primary.confidence_pct() >= 70.0 && secondary.confidence_pct() >= 70.0;

    if primary.phishing && secondary.phishing {
        if both_confident {
            CombinedRisk::Critical
        } else {
            CombinedRisk::High
        }
    } else if !primary.phishing && !secondary.phishing {
        if both_confident {
            CombinedRisk::Low
        } else {
            CombinedRisk::Uncertain
        }
    } else {
        CombinedRisk::Moderate
    }
}

fn verdict_label(verdict: &Verdict) -> &'static str {
    if verdict.phishing {
        "PHISHING"
    } else {
        "BENIGN"
    }
}

/// Format a single-model report block.
pub fn format_report(model_id: &str, verdict: &Verdict, text: &str) -> String {
    format!(
        "Phishing analysis (model: {})\n\n\
         Result: {}\n\
         Confidence: {:.1}%\n\
         Risk level: {}\n\n\
         Analyzed text: \"{}\"",
        model_id,
        verdict_label(verdict),
        verdict.confidence_pct(),
        risk_tier(verdict),
        preview(text, 100)
    )
}

/// Format a comparison report block.
pub fn format_comparison(
    primary_id: &str,
    primary: &Verdict,
    secondary_id: &str,
    secondary: &Verdict,
    text: &str,
) -> String {
    let combined = combined_risk(primary, secondary);

    format!(
        "Comparative phishing analysis\n\n\
         Model {}:\n\
         - Result: {}\n\
         - Confidence: {:.1}%\n\n\
         Model {}:\n\
         - Result: {}\n\
         - Confidence: {:.1}%\n\n\
         Overall:\n\
         - Risk level: {}\n\
         - Recommendation: {}\n\n\
         Analyzed text: \"{}\"",
        primary_id,
        verdict_label(primary),
        primary.confidence_pct(),
        secondary_id,
        verdict_label(secondary),
        secondary.confidence_pct(),
        combined,
        combined.recommendation(),
        preview(text, 100)
    )
}

/// Run one classifier over a text and return the formatted report.
///
/// Blank input is rejected before any external call; the input is cut to
/// the fixed token budget first.
pub async fn analyze(classifier: &dyn Classifier, text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(AgnError::InvalidInput("text must not be empty".to_string()));
    }

    let truncated = truncate_tokens(text, MAX_INPUT_TOKENS);
    let verdict = classifier.classify(truncated).await?;

    Ok(format_report(classifier.model_id(), &verdict, truncated))
}

/// Run both classifiers and return the formatted comparison report.
pub async fn analyze_comparative(
    primary: &dyn Classifier,
    secondary: &dyn Classifier,
    text: &str,
) -> Result<String> {
    if text.trim().is_empty() {
        return Err(AgnError::InvalidInput("text must not be empty".to_string()));
    }

    let truncated = truncate_tokens(text, MAX_INPUT_TOKENS);

    let primary_verdict = primary
        .classify(truncated)
        .await
        .map_err(|e| AgnError::Classifier(format!("model {}: {}", primary.model_id(), e)))?;
    let secondary_verdict = secondary
        .classify(truncated)
        .await
        .map_err(|e| AgnError::Classifier(format!("model {}: {}", secondary.model_id(), e)))?;

    Ok(format_comparison(
        primary.model_id(),
        &primary_verdict,
        secondary.model_id(),
        &secondary_verdict,
        truncated,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double that returns a fixed verdict and counts calls.
    pub(crate) struct StubClassifier {
        pub verdict: Verdict,
        pub calls: AtomicUsize,
        pub seen: std::sync::Mutex<Vec<String>>,
    }

    impl StubClassifier {
        pub fn new(phishing: bool, confidence: f64) -> Self {
            Self {
                verdict: Verdict {
                    phishing,
                    confidence,
                },
                calls: AtomicUsize::new(0),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Classifier for StubClassifier {
        async fn classify(&self, text: &str) -> Result<Verdict> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(text.to_string());
            Ok(self.verdict)
        }

        fn model_id(&self) -> &str {
            "stub/model"
        }
    }

    fn flagged(pct: f64) -> Verdict {
        Verdict {
            phishing: true,
            confidence: pct / 100.0,
        }
    }

    fn cleared(pct: f64) -> Verdict {
        Verdict {
            phishing: false,
            confidence: pct / 100.0,
        }
    }

    #[test]
    fn test_risk_tier_thresholds_exact() {
        assert_eq!(risk_tier(&flagged(90.0)), RiskTier::VeryHigh);
        assert_eq!(risk_tier(&flagged(89.9)), RiskTier::High);
        assert_eq!(risk_tier(&flagged(70.0)), RiskTier::High);
        assert_eq!(risk_tier(&flagged(69.9)), RiskTier::Moderate);
        assert_eq!(risk_tier(&cleared(99.0)), RiskTier::Low);
        assert_eq!(risk_tier(&cleared(10.0)), RiskTier::Low);
    }

    #[test]
    fn test_combined_risk_policy() {
        // Both flag with high confidence.
        assert_eq!(
            combined_risk(&flagged(85.0), &flagged(70.0)),
            CombinedRisk::Critical
        );
        // Both flag, one below threshold.
        assert_eq!(
            combined_risk(&flagged(85.0), &flagged(69.9)),
            CombinedRisk::High
        );
        // Both clear with high confidence.
        assert_eq!(
            combined_risk(&cleared(95.0), &cleared(80.0)),
            CombinedRisk::Low
        );
        // Both clear, low confidence.
        assert_eq!(
            combined_risk(&cleared(60.0), &cleared(95.0)),
            CombinedRisk::Uncertain
        );
        // Disagreement is MODERATE regardless of confidence.
        assert_eq!(
            combined_risk(&flagged(99.0), &cleared(99.0)),
            CombinedRisk::Moderate
        );
        assert_eq!(
            combined_risk(&cleared(10.0), &flagged(10.0)),
            CombinedRisk::Moderate
        );
    }

    #[tokio::test]
    async fn test_analyze_blank_input_no_call() {
        let stub = StubClassifier::new(true, 0.95);
        let result = analyze(&stub, "   \n\t ").await;
        assert!(matches!(result, Err(AgnError::InvalidInput(_))));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_truncates_before_call() {
        let stub = StubClassifier::new(false, 0.8);
        let words: Vec<String> = (0..600).map(|i| format!("w{}", i)).collect();
        analyze(&stub, &words.join(" ")).await.unwrap();

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].split_whitespace().count(), 512);
    }

    #[tokio::test]
    async fn test_analyze_report_content() {
        let stub = StubClassifier::new(true, 0.934);
        let report = analyze(&stub, "click here to verify your account").await.unwrap();

        assert!(report.contains("Result: PHISHING"));
        assert!(report.contains("Confidence: 93.4%"));
        assert!(report.contains("Risk level: VERY HIGH"));
        assert!(report.contains("stub/model"));
    }

    #[tokio::test]
    async fn test_comparative_blank_input_no_call() {
        let a = StubClassifier::new(true, 0.9);
        let b = StubClassifier::new(false, 0.9);
        assert!(analyze_comparative(&a, &b, "").await.is_err());
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_comparative_report_content() {
        let a = StubClassifier::new(true, 0.91);
        let b = StubClassifier::new(true, 0.72);
        let report = analyze_comparative(&a, &b, "urgent: wire funds now").await.unwrap();

        assert!(report.contains("Risk level: CRITICAL"));
        assert!(report.contains("Confidence: 91.0%"));
        assert!(report.contains("Confidence: 72.0%"));
    }
}
