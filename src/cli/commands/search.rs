//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::mail::{GmailMailbox, Mailbox, MISSING_FIELD};
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: Option<String>, limit: Option<u32>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Mail) {
        Output::error(&format!("{}", e));
        Output::info("Run 'agn doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let query = query.unwrap_or_else(|| settings.mail.default_query.clone());
    let limit = limit.unwrap_or(settings.mail.default_max_results);

    let mailbox = GmailMailbox::from_env()?;

    let spinner = Output::spinner("Searching...");
    let results = mailbox.search(&query, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(summaries) => {
            if summaries.is_empty() {
                Output::warning(&format!("No messages found for query: '{}'", query));
            } else {
                Output::success(&format!("Found {} messages", summaries.len()));

                for summary in &summaries {
                    Output::message_row(
                        summary.subject.as_deref().unwrap_or(MISSING_FIELD),
                        &summary.id,
                        summary.sender.as_deref().unwrap_or(MISSING_FIELD),
                        summary.date.as_deref().unwrap_or(MISSING_FIELD),
                        summary.snippet.as_deref().unwrap_or(""),
                    );
                }
                println!();
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
