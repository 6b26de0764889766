//! Agn - Phishing Triage Assistant
//!
//! A CLI assistant that searches your mailbox, classifies suspicious
//! messages, and answers questions about them through a tool-calling agent.
//!
//! The name "Agn" comes from the Norwegian word for "bait."
//!
//! # Overview
//!
//! Agn allows you to:
//! - Ask a hosted LLM agent to triage messages ("check my last email for phishing")
//! - Search and read mailbox messages from the terminal
//! - Classify any text with one or two phishing models
//! - Translate Spanish messages to English before analysis
//! - Export matching messages as HTML files
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `agent` - Tool-calling agent loop and tool registry
//! - `mail` - Mailbox abstraction (Gmail REST, in-memory)
//! - `classify` - Phishing classification and risk tiers
//! - `translate` - Spanish-to-English translation
//! - `export` - Bulk HTML export
//! - `inference` - Hosted inference API client
//!
//! # Example
//!
//! ```rust,no_run
//! use agn::agent::Agent;
//! use agn::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let context = agn::build_tool_context(&settings)?;
//!
//!     let agent = Agent::new(context, &settings.agent.model);
//!     let response = agent.run("Is my latest email phishing?").await?;
//!     println!("{}", response.content);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod inference;
pub mod mail;
pub mod openai;
pub mod text;
pub mod translate;

pub use error::{AgnError, Result};

use crate::classify::HfClassifier;
use crate::inference::InferenceClient;
use crate::mail::{GmailMailbox, Mailbox};
use crate::translate::HfTranslator;
use std::sync::Arc;

/// Construct the shared tool context from settings and environment
/// credentials.
///
/// Service objects are built once and held read-only for the rest of the
/// process.
pub fn build_tool_context(settings: &config::Settings) -> Result<agent::ToolContext> {
    let mailbox: Arc<dyn Mailbox> = Arc::new(GmailMailbox::from_env()?);
    let inference = Arc::new(InferenceClient::from_env()?);

    let primary = Arc::new(HfClassifier::new(
        inference.clone(),
        &settings.classifier.primary_model,
        &settings.classifier.primary_phishing_label,
    ));
    let secondary = Arc::new(HfClassifier::new(
        inference.clone(),
        &settings.classifier.secondary_model,
        &settings.classifier.secondary_phishing_label,
    ));
    let translator = Arc::new(HfTranslator::new(
        inference,
        &settings.translation.model,
        settings.translation.beam_width,
        settings.translation.max_length,
    ));

    Ok(agent::ToolContext::new(
        mailbox,
        primary,
        secondary,
        translator,
        settings.export_dir(),
    ))
}
