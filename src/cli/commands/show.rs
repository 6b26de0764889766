//! Show command implementation.

use crate::agent::format_message;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::mail::{GmailMailbox, Mailbox};
use anyhow::Result;

/// Run the show command.
pub async fn run_show(id: &str) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Mail) {
        Output::error(&format!("{}", e));
        Output::info("Run 'agn doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let mailbox = GmailMailbox::from_env()?;

    let spinner = Output::spinner("Fetching message...");
    let result = mailbox.get_message(id).await;
    spinner.finish_and_clear();

    match result {
        Ok(message) => {
            println!("\n{}\n", format_message(&message));
        }
        Err(e) => {
            Output::error(&format!("Failed to fetch message: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
