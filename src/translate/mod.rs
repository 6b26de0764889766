//! Spanish-to-English translation for Agn.

mod hf;

pub use hf::HfTranslator;

use crate::error::{AgnError, Result};
use crate::text::{truncate_tokens, MAX_INPUT_TOKENS};
use async_trait::async_trait;

/// Trait for translation backends.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate Spanish text to English.
    async fn translate(&self, text: &str) -> Result<String>;

    /// Identifier of the underlying model, shown in reports.
    fn model_id(&self) -> &str;
}

/// Format a translation report block.
pub fn format_translation(model_id: &str, original: &str, translation: &str) -> String {
    format!(
        "Translation (Spanish -> English)\n\n\
         Original: \"{}\"\n\
         Translation: \"{}\"\n\
         Model: {}",
        original, translation, model_id
    )
}

/// Translate a text and return the formatted report.
///
/// Blank input is rejected before any external call; the input is cut to
/// the fixed token budget first.
pub async fn translate_text(translator: &dyn Translator, text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(AgnError::InvalidInput("text must not be empty".to_string()));
    }

    let truncated = truncate_tokens(text, MAX_INPUT_TOKENS);
    let translation = translator.translate(truncated).await?;

    Ok(format_translation(
        translator.model_id(),
        truncated,
        &translation,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubTranslator {
        calls: AtomicUsize,
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl StubTranslator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Translator for StubTranslator {
        async fn translate(&self, text: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(text.to_string());
            Ok("translated".to_string())
        }

        fn model_id(&self) -> &str {
            "stub/translator"
        }
    }

    #[tokio::test]
    async fn test_blank_input_no_call() {
        let stub = StubTranslator::new();
        assert!(translate_text(&stub, "  ").await.is_err());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_truncates_before_call() {
        let stub = StubTranslator::new();
        let words: Vec<String> = (0..700).map(|i| format!("palabra{}", i)).collect();
        translate_text(&stub, &words.join(" ")).await.unwrap();

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].split_whitespace().count(), 512);
    }

    #[tokio::test]
    async fn test_report_content() {
        let stub = StubTranslator::new();
        let report = translate_text(&stub, "hola mundo").await.unwrap();
        assert!(report.contains("Original: \"hola mundo\""));
        assert!(report.contains("Translation: \"translated\""));
        assert!(report.contains("stub/translator"));
    }
}
