//! Classify command implementation.

use crate::classify::{analyze, analyze_comparative, HfClassifier};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::inference::InferenceClient;
use crate::mail::{GmailMailbox, Mailbox};
use anyhow::Result;
use std::sync::Arc;

/// Run the classify command on a text or a mailbox message.
pub async fn run_classify(
    text: Option<String>,
    message_id: Option<String>,
    compare: bool,
    settings: Settings,
) -> Result<()> {
    let text = match (text, message_id) {
        (Some(text), _) => text,
        (None, Some(id)) => {
            if let Err(e) = preflight::check(Operation::Mail) {
                Output::error(&format!("{}", e));
                return Err(e.into());
            }
            let mailbox = GmailMailbox::from_env()?;
            let message = mailbox.get_message(&id).await?;
            message
                .body
                .or(message.snippet)
                .ok_or_else(|| anyhow::anyhow!("Message {} has no readable body", id))?
        }
        (None, None) => {
            Output::error("Provide a text to classify or --message-id.");
            return Err(anyhow::anyhow!("missing input"));
        }
    };

    preflight::check(Operation::Inference)?;

    let inference = Arc::new(InferenceClient::from_env()?);
    let primary = HfClassifier::new(
        inference.clone(),
        &settings.classifier.primary_model,
        &settings.classifier.primary_phishing_label,
    );

    let spinner = Output::spinner("Classifying...");

    let result = if compare {
        let secondary = HfClassifier::new(
            inference,
            &settings.classifier.secondary_model,
            &settings.classifier.secondary_phishing_label,
        );
        analyze_comparative(&primary, &secondary, &text).await
    } else {
        analyze(&primary, &text).await
    };
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            println!("\n{}\n", report);
        }
        Err(e) => {
            Output::error(&format!("Classification failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
