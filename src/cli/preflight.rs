//! Pre-flight checks before operations that hit external services.
//!
//! Validates that required credentials are present before starting
//! operations that would otherwise fail midway.

use crate::error::{AgnError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// The agent needs the chat model and the mailbox.
    Agent,
    /// Mailbox operations need the provider token.
    Mail,
    /// Classification/translation; the inference token is optional.
    Inference,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Agent => {
            check_openai_key()?;
            check_gmail_token()?;
        }
        Operation::Mail => {
            check_gmail_token()?;
        }
        Operation::Inference => {
            // Anonymous inference calls work, just rate-limited.
        }
    }
    Ok(())
}

/// Check if the OpenAI API key is configured.
fn check_openai_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(AgnError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(AgnError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if the Gmail access token is configured.
fn check_gmail_token() -> Result<()> {
    match std::env::var("GMAIL_ACCESS_TOKEN") {
        Ok(token) if !token.is_empty() => Ok(()),
        Ok(_) => Err(AgnError::Config(
            "GMAIL_ACCESS_TOKEN is empty. Export an OAuth access token for your mailbox."
                .to_string(),
        )),
        Err(_) => Err(AgnError::Config(
            "GMAIL_ACCESS_TOKEN not set. Export an OAuth access token for your mailbox."
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_inference_no_requirements() {
        // Inference should always pass pre-flight (token is optional).
        assert!(check(Operation::Inference).is_ok());
    }
}
