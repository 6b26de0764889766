//! CLI module for Agn.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Agn - Phishing Triage Assistant
///
/// A CLI assistant that searches your mailbox, classifies suspicious
/// messages, and answers questions about them. The name "Agn" comes from
/// the Norwegian word for "bait."
#[derive(Parser, Debug)]
#[command(name = "agn")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Agn and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Run the triage agent on a task (e.g. "check my last email for phishing")
    Agent {
        /// The task for the agent to perform
        task: String,

        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an interactive triage chat session
    Chat {
        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Search the mailbox
    Search {
        /// Search query in provider syntax (default: in:inbox)
        query: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show the full content of one message
    Show {
        /// Message id (from 'agn search')
        id: String,
    },

    /// Send an email
    Send {
        /// Recipient addresses (repeatable)
        #[arg(short, long, required = true)]
        to: Vec<String>,

        /// Subject line
        #[arg(short, long)]
        subject: String,

        /// Message body
        #[arg(short, long)]
        body: String,
    },

    /// Save an email as a draft without sending
    Draft {
        /// Recipient addresses (repeatable)
        #[arg(short, long, required = true)]
        to: Vec<String>,

        /// Subject line
        #[arg(short, long)]
        subject: String,

        /// Message body
        #[arg(short, long)]
        body: String,
    },

    /// Export matching messages as HTML files
    Export {
        /// Search query selecting messages to export
        query: Option<String>,

        /// Maximum number of messages
        #[arg(short, long)]
        limit: Option<u32>,

        /// Output directory (overrides configuration)
        #[arg(short, long)]
        output_dir: Option<String>,
    },

    /// Classify a text (or a message body) as phishing or benign
    Classify {
        /// Text to classify
        text: Option<String>,

        /// Classify the body of a mailbox message instead
        #[arg(short, long, conflicts_with = "text")]
        message_id: Option<String>,

        /// Run both models and combine their verdicts
        #[arg(long)]
        compare: bool,
    },

    /// Translate Spanish text to English
    Translate {
        /// Spanish text to translate
        text: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "agent.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
