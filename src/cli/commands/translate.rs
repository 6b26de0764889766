//! Translate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::inference::InferenceClient;
use crate::translate::{translate_text, HfTranslator};
use anyhow::Result;
use std::sync::Arc;

/// Run the translate command.
pub async fn run_translate(text: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Inference)?;

    let inference = Arc::new(InferenceClient::from_env()?);
    let translator = HfTranslator::new(
        inference,
        &settings.translation.model,
        settings.translation.beam_width,
        settings.translation.max_length,
    );

    let spinner = Output::spinner("Translating...");
    let result = translate_text(&translator, text).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            println!("\n{}\n", report);
        }
        Err(e) => {
            Output::error(&format!("Translation failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
