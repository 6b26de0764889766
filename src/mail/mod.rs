//! Mailbox abstraction for Agn.
//!
//! Provides a trait-based interface over webmail providers, plus the
//! message and payload types shared by the tool layer and the exporter.

mod gmail;
mod memory;

pub use gmail::GmailMailbox;
pub use memory::MemoryMailbox;

use crate::error::{AgnError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Placeholder used when a provider omits a field.
pub const MISSING_FIELD: &str = "not available";

/// One row of a mailbox search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSummary {
    /// Provider-unique message id.
    pub id: String,
    /// Conversation thread id.
    pub thread_id: Option<String>,
    /// Sender address as reported by the provider.
    pub sender: Option<String>,
    /// Subject line.
    pub subject: Option<String>,
    /// Short content preview.
    pub snippet: Option<String>,
    /// Message date, already rendered for display.
    pub date: Option<String>,
}

/// A fully fetched message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: String,
    pub thread_id: Option<String>,
    pub sender: Option<String>,
    pub subject: Option<String>,
    pub snippet: Option<String>,
    /// Decoded text body.
    pub body: Option<String>,
    pub date: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Attachment metadata (content is never fetched).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
}

/// An outgoing message or draft.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Structured result of a send or draft-create operation.
///
/// The provider's confirmation is returned as ids, never re-parsed out of
/// free text.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub id: String,
    pub thread_id: Option<String>,
}

/// MIME tree of a message as stored by the provider.
///
/// `body_data` stays base64url-encoded until extraction, matching the wire
/// format.
#[derive(Debug, Clone, Default)]
pub struct MessagePayload {
    pub mime_type: String,
    pub filename: String,
    pub body_data: Option<String>,
    pub parts: Vec<MessagePayload>,
}

/// Trait for mailbox implementations.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Search messages with the provider's query syntax (`from:`, `subject:`,
    /// `in:inbox`); queries pass through unmodified.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<MessageSummary>>;

    /// Fetch a full message by id.
    async fn get_message(&self, id: &str) -> Result<MailMessage>;

    /// Fetch the raw MIME payload tree of a message.
    async fn get_payload(&self, id: &str) -> Result<MessagePayload>;

    /// Send a message. Not idempotent: sending twice sends twice.
    async fn send_message(&self, message: &OutgoingMessage) -> Result<SendOutcome>;

    /// Save a message as a draft without sending.
    async fn create_draft(&self, message: &OutgoingMessage) -> Result<SendOutcome>;
}

/// Validate recipient addresses, rejecting the whole batch on the first bad one.
pub fn validate_recipients(to: &[String]) -> Result<()> {
    // Loose shape check only; the provider does the real validation.
    let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex");

    if to.is_empty() {
        return Err(AgnError::InvalidInput(
            "at least one recipient is required".to_string(),
        ));
    }

    for addr in to {
        if !re.is_match(addr.trim()) {
            return Err(AgnError::InvalidInput(format!(
                "'{}' is not a valid email address",
                addr
            )));
        }
    }

    Ok(())
}

/// Decode base64url data, trying UTF-8 first and falling back to Latin-1.
pub fn decode_base64url(data: &str) -> Result<String> {
    let trimmed = data.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|e| AgnError::Mail(format!("Invalid base64 body data: {}", e)))?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => Ok(e.into_bytes().iter().map(|&b| b as char).collect()),
    }
}

/// Extract displayable HTML from a message payload.
///
/// Walks the parts for a `text/html` part, then checks the root payload,
/// and finally wraps a `text/plain` part in `<pre>` so it can still be
/// saved as HTML. Returns None when nothing displayable exists.
pub fn extract_html(payload: &MessagePayload) -> Option<String> {
    for part in &payload.parts {
        if part.mime_type == "text/html" {
            if let Some(data) = &part.body_data {
                if let Ok(html) = decode_base64url(data) {
                    return Some(html);
                }
            }
        }
    }

    if payload.mime_type == "text/html" {
        if let Some(data) = &payload.body_data {
            if let Ok(html) = decode_base64url(data) {
                return Some(html);
            }
        }
    }

    for part in &payload.parts {
        if part.mime_type == "text/plain" {
            if let Some(data) = &part.body_data {
                if let Ok(text) = decode_base64url(data) {
                    return Some(format!("<pre>{}</pre>", text));
                }
            }
        }
    }

    None
}

/// Extract the plain-text body of a message payload.
///
/// Prefers a `text/plain` part, falling back to whatever the root body
/// decodes to.
pub fn extract_text(payload: &MessagePayload) -> Option<String> {
    for part in &payload.parts {
        if part.mime_type == "text/plain" {
            if let Some(data) = &part.body_data {
                if let Ok(text) = decode_base64url(data) {
                    return Some(text);
                }
            }
        }
    }

    if let Some(data) = &payload.body_data {
        if let Ok(text) = decode_base64url(data) {
            return Some(text);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE;

    fn encode(text: &str) -> String {
        URL_SAFE.encode(text.as_bytes())
    }

    #[test]
    fn test_validate_recipients() {
        assert!(validate_recipients(&["user@example.com".to_string()]).is_ok());
        assert!(validate_recipients(&[]).is_err());
        assert!(validate_recipients(&["not-an-address".to_string()]).is_err());
        assert!(validate_recipients(&["user@nodot".to_string()]).is_err());
    }

    #[test]
    fn test_decode_base64url_utf8() {
        assert_eq!(decode_base64url(&encode("hola mundo")).unwrap(), "hola mundo");
    }

    #[test]
    fn test_decode_base64url_latin1_fallback() {
        // 0xE9 is 'é' in Latin-1 but invalid standalone UTF-8.
        let data = URL_SAFE.encode([0x63, 0x61, 0x66, 0xE9]);
        assert_eq!(decode_base64url(&data).unwrap(), "café");
    }

    #[test]
    fn test_extract_html_from_part() {
        let payload = MessagePayload {
            mime_type: "multipart/alternative".to_string(),
            parts: vec![
                MessagePayload {
                    mime_type: "text/plain".to_string(),
                    body_data: Some(encode("plain")),
                    ..Default::default()
                },
                MessagePayload {
                    mime_type: "text/html".to_string(),
                    body_data: Some(encode("<p>hi</p>")),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(extract_html(&payload).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn test_extract_html_plain_fallback() {
        let payload = MessagePayload {
            mime_type: "multipart/alternative".to_string(),
            parts: vec![MessagePayload {
                mime_type: "text/plain".to_string(),
                body_data: Some(encode("just text")),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(extract_html(&payload).unwrap(), "<pre>just text</pre>");
    }

    #[test]
    fn test_extract_html_root_body() {
        let payload = MessagePayload {
            mime_type: "text/html".to_string(),
            body_data: Some(encode("<b>root</b>")),
            ..Default::default()
        };
        assert_eq!(extract_html(&payload).unwrap(), "<b>root</b>");
    }

    #[test]
    fn test_extract_html_none() {
        let payload = MessagePayload {
            mime_type: "image/png".to_string(),
            body_data: Some(encode("binary")),
            ..Default::default()
        };
        assert!(extract_html(&payload).is_none());
    }

    #[test]
    fn test_extract_text_prefers_plain_part() {
        let payload = MessagePayload {
            mime_type: "multipart/alternative".to_string(),
            body_data: Some(encode("root")),
            parts: vec![MessagePayload {
                mime_type: "text/plain".to_string(),
                body_data: Some(encode("part text")),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(extract_text(&payload).unwrap(), "part text");
    }
}
