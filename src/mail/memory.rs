//! In-memory mailbox implementation.
//!
//! Useful for tests and offline runs.

use super::{
    MailMessage, Mailbox, MessagePayload, MessageSummary, OutgoingMessage, SendOutcome,
};
use crate::error::{AgnError, Result};
use async_trait::async_trait;
use std::sync::RwLock;

/// A stored message with its payload tree.
#[derive(Debug, Clone)]
struct StoredMessage {
    message: MailMessage,
    payload: MessagePayload,
}

/// In-memory mailbox; messages are kept in insertion order.
#[derive(Default)]
pub struct MemoryMailbox {
    messages: RwLock<Vec<StoredMessage>>,
    outgoing: RwLock<Vec<OutgoingMessage>>,
}

impl MemoryMailbox {
    /// Create an empty in-memory mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a message with its payload.
    pub fn insert(&self, message: MailMessage, payload: MessagePayload) {
        self.messages
            .write()
            .unwrap()
            .push(StoredMessage { message, payload });
    }

    /// Messages sent or drafted through this mailbox.
    pub fn outgoing_count(&self) -> usize {
        self.outgoing.read().unwrap().len()
    }

    fn matches(message: &MailMessage, query: &str) -> bool {
        // Provider operators like "in:inbox" select everything here; anything
        // else is a substring match over the visible fields.
        if query.trim().is_empty() || query.trim() == "in:inbox" {
            return true;
        }

        let needle = query.to_lowercase();
        [
            message.sender.as_deref(),
            message.subject.as_deref(),
            message.snippet.as_deref(),
            message.body.as_deref(),
        ]
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    fn record_outgoing(&self, message: &OutgoingMessage, prefix: &str) -> SendOutcome {
        let mut outgoing = self.outgoing.write().unwrap();
        outgoing.push(message.clone());
        SendOutcome {
            id: format!("{}-{}", prefix, outgoing.len()),
            thread_id: None,
        }
    }
}

#[async_trait]
impl Mailbox for MemoryMailbox {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<MessageSummary>> {
        let messages = self.messages.read().unwrap();

        Ok(messages
            .iter()
            .filter(|stored| Self::matches(&stored.message, query))
            .take(max_results as usize)
            .map(|stored| MessageSummary {
                id: stored.message.id.clone(),
                thread_id: stored.message.thread_id.clone(),
                sender: stored.message.sender.clone(),
                subject: stored.message.subject.clone(),
                snippet: stored.message.snippet.clone(),
                date: stored.message.date.clone(),
            })
            .collect())
    }

    async fn get_message(&self, id: &str) -> Result<MailMessage> {
        let messages = self.messages.read().unwrap();
        messages
            .iter()
            .find(|stored| stored.message.id == id)
            .map(|stored| stored.message.clone())
            .ok_or_else(|| AgnError::MessageNotFound(id.to_string()))
    }

    async fn get_payload(&self, id: &str) -> Result<MessagePayload> {
        let messages = self.messages.read().unwrap();
        messages
            .iter()
            .find(|stored| stored.message.id == id)
            .map(|stored| stored.payload.clone())
            .ok_or_else(|| AgnError::MessageNotFound(id.to_string()))
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<SendOutcome> {
        Ok(self.record_outgoing(message, "sent"))
    }

    async fn create_draft(&self, message: &OutgoingMessage) -> Result<SendOutcome> {
        Ok(self.record_outgoing(message, "draft"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, subject: &str) -> MailMessage {
        MailMessage {
            id: id.to_string(),
            thread_id: Some(format!("t-{}", id)),
            sender: Some("alice@example.com".to_string()),
            subject: Some(subject.to_string()),
            snippet: Some("preview".to_string()),
            body: Some("body text".to_string()),
            date: Some("2024-01-15 12:00 UTC".to_string()),
            attachments: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_search_and_get() {
        let mailbox = MemoryMailbox::new();
        mailbox.insert(sample("m1", "Invoice overdue"), MessagePayload::default());
        mailbox.insert(sample("m2", "Lunch plans"), MessagePayload::default());

        let all = mailbox.search("in:inbox", 10).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "m1");

        let matched = mailbox.search("invoice", 10).await.unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "m1");

        let capped = mailbox.search("in:inbox", 1).await.unwrap();
        assert_eq!(capped.len(), 1);

        let message = mailbox.get_message("m2").await.unwrap();
        assert_eq!(message.subject.as_deref(), Some("Lunch plans"));

        assert!(matches!(
            mailbox.get_message("missing").await,
            Err(AgnError::MessageNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_send_records_outgoing() {
        let mailbox = MemoryMailbox::new();
        let message = OutgoingMessage {
            to: vec!["bob@example.com".to_string()],
            subject: "hi".to_string(),
            body: "there".to_string(),
        };

        let sent = mailbox.send_message(&message).await.unwrap();
        assert_eq!(sent.id, "sent-1");

        let draft = mailbox.create_draft(&message).await.unwrap();
        assert_eq!(draft.id, "draft-2");
        assert_eq!(mailbox.outgoing_count(), 2);
    }
}
