//! Export command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::export::export_messages_as_html;
use crate::mail::GmailMailbox;
use anyhow::Result;

/// Run the export command.
pub async fn run_export(
    query: Option<String>,
    limit: Option<u32>,
    output_dir: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Mail) {
        Output::error(&format!("{}", e));
        Output::info("Run 'agn doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let query = query.unwrap_or_else(|| settings.mail.default_query.clone());
    let limit = limit.unwrap_or(settings.mail.default_max_results);
    let out_dir = match output_dir {
        Some(dir) => Settings::expand_path(&dir),
        None => settings.export_dir(),
    };

    let mailbox = GmailMailbox::from_env()?;

    let spinner = Output::spinner("Exporting messages...");
    let result = export_messages_as_html(&mailbox, &query, limit, &out_dir).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            if report.saved.is_empty() && report.failed.is_empty() {
                Output::warning(&format!("No messages found for query: '{}'", query));
                return Ok(());
            }

            if !report.saved.is_empty() {
                Output::success(&format!(
                    "Exported {} messages to {}",
                    report.saved.len(),
                    out_dir.display()
                ));
                for path in &report.saved {
                    Output::list_item(&format!("{}", path.display()));
                }
            }

            if !report.failed.is_empty() {
                Output::warning(&format!("{} messages failed:", report.failed.len()));
                for failure in &report.failed {
                    Output::list_item(failure);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Export failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
