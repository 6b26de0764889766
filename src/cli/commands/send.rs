//! Send and draft command implementations.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::mail::{validate_recipients, GmailMailbox, Mailbox, OutgoingMessage};
use anyhow::Result;

/// Run the send or draft command.
pub async fn run_send(to: &[String], subject: &str, body: &str, draft: bool) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Mail) {
        Output::error(&format!("{}", e));
        Output::info("Run 'agn doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if body.trim().is_empty() {
        Output::error("Message body must not be empty.");
        return Err(anyhow::anyhow!("empty message body"));
    }
    validate_recipients(to)?;

    let mailbox = GmailMailbox::from_env()?;
    let message = OutgoingMessage {
        to: to.to_vec(),
        subject: subject.to_string(),
        body: body.to_string(),
    };

    let spinner = Output::spinner(if draft { "Creating draft..." } else { "Sending..." });

    let result = if draft {
        mailbox.create_draft(&message).await
    } else {
        mailbox.send_message(&message).await
    };
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => {
            if draft {
                Output::success("Draft created");
            } else {
                Output::success("Message sent");
            }
            Output::kv("id", &outcome.id);
            if let Some(thread_id) = &outcome.thread_id {
                Output::kv("thread", thread_id);
            }
        }
        Err(e) => {
            Output::error(&format!("Failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
