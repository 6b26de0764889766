//! Bulk HTML export of mailbox messages.
//!
//! Searches the mailbox and writes one HTML file per matching message,
//! falling back to a `<pre>` wrap of the plain-text part when no HTML part
//! exists. Per-message failures are collected instead of aborting the
//! batch; files already written stay on disk.

use crate::error::Result;
use crate::mail::{extract_html, Mailbox};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Partitioned outcome of a bulk export.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Files written, one per exported message.
    pub saved: Vec<PathBuf>,
    /// Message ids (with reasons where known) that could not be exported.
    pub failed: Vec<String>,
}

impl ExportReport {
    /// Render the report as a text block for the conversation.
    pub fn render(&self, query: &str) -> String {
        if self.saved.is_empty() && self.failed.is_empty() {
            return format!("No messages found for query: '{}'", query);
        }

        let mut lines = Vec::new();

        if !self.saved.is_empty() {
            lines.push(format!("{} messages exported:", self.saved.len()));
            for path in &self.saved {
                lines.push(format!("- {}", path.display()));
            }
        }

        if !self.failed.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("{} messages failed:", self.failed.len()));
            for failure in &self.failed {
                lines.push(format!("- {}", failure));
            }
        }

        lines.join("\n")
    }
}

/// Export messages matching `query` as HTML files under `out_dir`.
///
/// The directory is created if absent. File names are `<message id>.html`;
/// ids are provider-unique so collisions are not handled.
pub async fn export_messages_as_html(
    mailbox: &dyn Mailbox,
    query: &str,
    max_results: u32,
    out_dir: &Path,
) -> Result<ExportReport> {
    let summaries = mailbox.search(query, max_results).await?;

    let mut report = ExportReport::default();

    if summaries.is_empty() {
        return Ok(report);
    }

    std::fs::create_dir_all(out_dir)?;

    for summary in summaries {
        match mailbox.get_payload(&summary.id).await {
            Ok(payload) => match extract_html(&payload) {
                Some(html) => {
                    let path = out_dir.join(format!("{}.html", summary.id));
                    match std::fs::write(&path, html) {
                        Ok(()) => {
                            debug!("Exported {} to {}", summary.id, path.display());
                            report.saved.push(path);
                        }
                        Err(e) => {
                            warn!("Failed to write {}: {}", path.display(), e);
                            report.failed.push(format!("{} ({})", summary.id, e));
                        }
                    }
                }
                None => report.failed.push(summary.id),
            },
            Err(e) => {
                warn!("Failed to fetch payload for {}: {}", summary.id, e);
                report.failed.push(format!("{} ({})", summary.id, e));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::{MailMessage, MemoryMailbox, MessagePayload};
    use base64::{engine::general_purpose::URL_SAFE, Engine as _};

    fn message(id: &str) -> MailMessage {
        MailMessage {
            id: id.to_string(),
            thread_id: None,
            sender: Some("sender@example.com".to_string()),
            subject: Some("subject".to_string()),
            snippet: None,
            body: None,
            date: None,
            attachments: Vec::new(),
        }
    }

    fn html_payload(html: &str) -> MessagePayload {
        MessagePayload {
            mime_type: "multipart/alternative".to_string(),
            parts: vec![MessagePayload {
                mime_type: "text/html".to_string(),
                body_data: Some(URL_SAFE.encode(html.as_bytes())),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn plain_payload(text: &str) -> MessagePayload {
        MessagePayload {
            mime_type: "multipart/alternative".to_string(),
            parts: vec![MessagePayload {
                mime_type: "text/plain".to_string(),
                body_data: Some(URL_SAFE.encode(text.as_bytes())),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn opaque_payload() -> MessagePayload {
        MessagePayload {
            mime_type: "image/png".to_string(),
            body_data: Some(URL_SAFE.encode(b"binary")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_export_partitions_success_and_failure() {
        let mailbox = MemoryMailbox::new();
        mailbox.insert(message("m1"), html_payload("<p>one</p>"));
        mailbox.insert(message("m2"), opaque_payload());
        mailbox.insert(message("m3"), html_payload("<p>three</p>"));

        let dir = tempfile::tempdir().unwrap();
        let report = export_messages_as_html(&mailbox, "in:inbox", 10, dir.path())
            .await
            .unwrap();

        assert_eq!(report.saved.len(), 2);
        assert_eq!(report.failed, vec!["m2".to_string()]);

        let saved = std::fs::read_to_string(dir.path().join("m1.html")).unwrap();
        assert_eq!(saved, "<p>one</p>");
    }

    #[tokio::test]
    async fn test_export_plain_text_fallback() {
        let mailbox = MemoryMailbox::new();
        mailbox.insert(message("m1"), plain_payload("plain body"));

        let dir = tempfile::tempdir().unwrap();
        let report = export_messages_as_html(&mailbox, "in:inbox", 10, dir.path())
            .await
            .unwrap();

        assert_eq!(report.saved.len(), 1);
        assert!(report.failed.is_empty());

        let saved = std::fs::read_to_string(dir.path().join("m1.html")).unwrap();
        assert_eq!(saved, "<pre>plain body</pre>");
    }

    #[tokio::test]
    async fn test_export_no_matches() {
        let mailbox = MemoryMailbox::new();
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("unused");

        let report = export_messages_as_html(&mailbox, "in:inbox", 10, &out_dir)
            .await
            .unwrap();

        assert!(report.saved.is_empty());
        assert!(report.failed.is_empty());
        // No directory is created when nothing matches.
        assert!(!out_dir.exists());
        assert!(report.render("in:inbox").contains("No messages found"));
    }

    #[test]
    fn test_report_render() {
        let report = ExportReport {
            saved: vec![PathBuf::from("/tmp/a.html")],
            failed: vec!["m9".to_string()],
        };
        let rendered = report.render("from:platzi");
        assert!(rendered.contains("1 messages exported:"));
        assert!(rendered.contains("/tmp/a.html"));
        assert!(rendered.contains("1 messages failed:"));
        assert!(rendered.contains("- m9"));
    }
}
