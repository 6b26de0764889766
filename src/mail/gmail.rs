//! Gmail REST adapter.
//!
//! Maps each mailbox operation to one Gmail v1 API call. The access token
//! is held read-only after construction and reused across sequential calls.

use super::{
    extract_text, Attachment, MailMessage, Mailbox, MessagePayload, MessageSummary,
    OutgoingMessage, SendOutcome,
};
use crate::error::{AgnError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use chrono::TimeZone;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Base endpoint for the Gmail v1 API.
const GMAIL_ENDPOINT: &str = "https://gmail.googleapis.com/gmail/v1/";

/// Request timeout for mailbox calls.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gmail-backed mailbox.
pub struct GmailMailbox {
    http: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl GmailMailbox {
    /// Create a mailbox from the `GMAIL_ACCESS_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GMAIL_ACCESS_TOKEN").map_err(|_| {
            AgnError::Config(
                "GMAIL_ACCESS_TOKEN not set. Obtain an OAuth access token and export it."
                    .to_string(),
            )
        })?;
        Self::new(&token)
    }

    /// Create a mailbox with an explicit access token.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_endpoint(GMAIL_ENDPOINT, token)
    }

    /// Create a mailbox against a custom endpoint (used in tests).
    pub fn with_endpoint(endpoint: &str, token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(AgnError::Config("Gmail access token is empty".to_string()));
        }

        let endpoint = Url::parse(endpoint)
            .map_err(|e| AgnError::Config(format!("Invalid Gmail endpoint: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            token: token.to_string(),
        })
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        self.endpoint
            .join(path)
            .map_err(|e| AgnError::Mail(format!("Invalid API path '{}': {}", path, e)))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        not_found_id: Option<&str>,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = not_found_id {
                return Err(AgnError::MessageNotFound(id.to_string()));
            }
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgnError::Mail(format!("Gmail API returned {}: {}", status, text)));
        }

        Ok(response.json().await?)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http
            .post(url)
            .json(body)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgnError::Mail(format!("Gmail API returned {}: {}", status, text)));
        }

        Ok(response.json().await?)
    }

    /// Fetch a message with the given format (`metadata` or `full`).
    async fn fetch_message(&self, id: &str, format: &str) -> Result<MessageResponse> {
        let url = self.api_url(&format!("users/me/messages/{}", id))?;
        self.get_json(url, &[("format", format.to_string())], Some(id))
            .await
    }
}

#[async_trait]
impl Mailbox for GmailMailbox {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<MessageSummary>> {
        let url = self.api_url("users/me/messages")?;
        let list: MessageListResponse = self
            .get_json(
                url,
                &[
                    ("q", query.to_string()),
                    ("maxResults", max_results.to_string()),
                ],
                None,
            )
            .await?;

        debug!("Search '{}' matched {} messages", query, list.messages.len());

        // One metadata fetch per hit, strictly sequential.
        let mut summaries = Vec::with_capacity(list.messages.len());
        for message_ref in list.messages {
            let message = self.fetch_message(&message_ref.id, "metadata").await?;
            summaries.push(message.into_summary());
        }

        Ok(summaries)
    }

    #[instrument(skip(self))]
    async fn get_message(&self, id: &str) -> Result<MailMessage> {
        let message = self.fetch_message(id, "full").await?;
        Ok(message.into_mail_message())
    }

    #[instrument(skip(self))]
    async fn get_payload(&self, id: &str) -> Result<MessagePayload> {
        let message = self.fetch_message(id, "full").await?;
        message
            .payload
            .map(PayloadResponse::into_payload)
            .ok_or_else(|| AgnError::Mail(format!("Message {} has no payload", id)))
    }

    #[instrument(skip(self, message))]
    async fn send_message(&self, message: &OutgoingMessage) -> Result<SendOutcome> {
        let url = self.api_url("users/me/messages/send")?;
        let body = serde_json::json!({ "raw": compose_raw(message) });
        let response: SendResponse = self.post_json(url, &body).await?;

        Ok(SendOutcome {
            id: response.id,
            thread_id: response.thread_id,
        })
    }

    #[instrument(skip(self, message))]
    async fn create_draft(&self, message: &OutgoingMessage) -> Result<SendOutcome> {
        let url = self.api_url("users/me/drafts")?;
        let body = serde_json::json!({ "message": { "raw": compose_raw(message) } });
        let response: DraftResponse = self.post_json(url, &body).await?;

        Ok(SendOutcome {
            id: response.id,
            thread_id: response.message.and_then(|m| m.thread_id),
        })
    }
}

/// Compose a base64url-encoded RFC 2822 message.
///
/// The body is wrapped in `<b>…</b>` and sent as HTML.
fn compose_raw(message: &OutgoingMessage) -> String {
    let mime = format!(
        "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=\"UTF-8\"\r\n\r\n<b>{}</b>",
        message.to.join(", "),
        message.subject,
        message.body
    );
    URL_SAFE.encode(mime.as_bytes())
}

/// Render the provider's epoch-milliseconds date for display.
fn format_internal_date(millis: &str) -> Option<String> {
    let millis: i64 = millis.parse().ok()?;
    chrono::Utc
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageResponse {
    id: String,
    thread_id: Option<String>,
    snippet: Option<String>,
    internal_date: Option<String>,
    payload: Option<PayloadResponse>,
}

impl MessageResponse {
    fn header(&self, name: &str) -> Option<String> {
        self.payload.as_ref().and_then(|p| {
            p.headers
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case(name))
                .map(|h| h.value.clone())
        })
    }

    fn into_summary(self) -> MessageSummary {
        MessageSummary {
            sender: self.header("From"),
            subject: self.header("Subject"),
            date: self.internal_date.as_deref().and_then(format_internal_date),
            id: self.id,
            thread_id: self.thread_id,
            snippet: self.snippet,
        }
    }

    fn into_mail_message(self) -> MailMessage {
        let sender = self.header("From");
        let subject = self.header("Subject");
        let date = self.internal_date.as_deref().and_then(format_internal_date);

        let (body, attachments) = match &self.payload {
            Some(payload) => {
                let converted = payload.clone().into_payload();
                (extract_text(&converted), payload.attachments())
            }
            None => (None, Vec::new()),
        };

        MailMessage {
            id: self.id,
            thread_id: self.thread_id,
            sender,
            subject,
            snippet: self.snippet,
            body,
            date,
            attachments,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadResponse {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    headers: Vec<HeaderResponse>,
    body: Option<BodyResponse>,
    #[serde(default)]
    parts: Vec<PayloadResponse>,
}

impl PayloadResponse {
    fn into_payload(self) -> MessagePayload {
        MessagePayload {
            mime_type: self.mime_type,
            filename: self.filename,
            body_data: self.body.and_then(|b| b.data),
            parts: self
                .parts
                .into_iter()
                .map(PayloadResponse::into_payload)
                .collect(),
        }
    }

    /// Attachment metadata: any part carrying a filename.
    fn attachments(&self) -> Vec<Attachment> {
        self.parts
            .iter()
            .filter(|p| !p.filename.is_empty())
            .map(|p| Attachment {
                filename: p.filename.clone(),
                mime_type: p.mime_type.clone(),
                size: p.body.as_ref().map(|b| b.size).unwrap_or(0),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct HeaderResponse {
    name: String,
    value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BodyResponse {
    #[serde(default)]
    size: u64,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    id: String,
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DraftResponse {
    id: String,
    message: Option<SendResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::decode_base64url;

    #[test]
    fn test_compose_raw_roundtrip() {
        let message = OutgoingMessage {
            to: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            subject: "hello".to_string(),
            body: "world".to_string(),
        };

        let decoded = decode_base64url(&compose_raw(&message)).unwrap();
        assert!(decoded.starts_with("To: a@example.com, b@example.com\r\n"));
        assert!(decoded.contains("Subject: hello\r\n"));
        assert!(decoded.ends_with("<b>world</b>"));
    }

    #[test]
    fn test_format_internal_date() {
        // 2024-01-15 12:00:00 UTC
        let formatted = format_internal_date("1705320000000").unwrap();
        assert_eq!(formatted, "2024-01-15 12:00 UTC");
        assert!(format_internal_date("not-a-number").is_none());
    }

    #[test]
    fn test_message_response_parsing() {
        let json = serde_json::json!({
            "id": "m1",
            "threadId": "t1",
            "snippet": "hey there",
            "internalDate": "1705320000000",
            "payload": {
                "mimeType": "multipart/mixed",
                "headers": [
                    {"name": "From", "value": "alice@example.com"},
                    {"name": "subject", "value": "Greetings"}
                ],
                "parts": [
                    {
                        "mimeType": "text/plain",
                        "body": {"size": 5, "data": "aGVsbG8="}
                    },
                    {
                        "mimeType": "application/pdf",
                        "filename": "doc.pdf",
                        "body": {"size": 1234}
                    }
                ]
            }
        });

        let message: MessageResponse = serde_json::from_value(json).unwrap();
        let mail = message.into_mail_message();

        assert_eq!(mail.sender.as_deref(), Some("alice@example.com"));
        // Header lookup is case-insensitive.
        assert_eq!(mail.subject.as_deref(), Some("Greetings"));
        assert_eq!(mail.body.as_deref(), Some("hello"));
        assert_eq!(mail.attachments.len(), 1);
        assert_eq!(mail.attachments[0].filename, "doc.pdf");
        assert_eq!(mail.attachments[0].size, 1234);
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(GmailMailbox::new("  ").is_err());
    }
}
