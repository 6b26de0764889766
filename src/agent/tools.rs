//! Tool definitions and implementations for the agent system.

use crate::classify::{analyze, analyze_comparative, Classifier};
use crate::error::{AgnError, Result};
use crate::export::export_messages_as_html;
use crate::mail::{validate_recipients, MailMessage, Mailbox, OutgoingMessage, MISSING_FIELD};
use crate::translate::{translate_text, Translator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Available tools for the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Search the mailbox with provider query syntax.
    SearchMail {
        #[serde(default = "default_query")]
        query: String,
        #[serde(default = "default_max_results")]
        max_results: u32,
    },

    /// Fetch the full content of one message.
    GetMessage { id: String },

    /// Send a message. Has an external side effect; not idempotent.
    SendMessage {
        to: Vec<String>,
        subject: String,
        body: String,
    },

    /// Save a message as a draft without sending.
    CreateDraft {
        to: Vec<String>,
        subject: String,
        body: String,
    },

    /// Export matching messages as HTML files.
    ExportHtml {
        query: String,
        #[serde(default = "default_max_results")]
        max_results: u32,
    },

    /// Classify a text with the primary phishing model.
    ClassifyText { text: String },

    /// Classify a text with both models and combine the verdicts.
    CompareClassifiers { text: String },

    /// Translate Spanish text to English.
    TranslateEsEn { text: String },
}

fn default_query() -> String {
    "in:inbox".to_string()
}

fn default_max_results() -> u32 {
    3
}

/// Tool execution context holding the service objects.
///
/// Services are constructed once at startup and shared read-only.
pub struct ToolContext {
    pub mailbox: Arc<dyn Mailbox>,
    pub primary: Arc<dyn Classifier>,
    pub secondary: Arc<dyn Classifier>,
    pub translator: Arc<dyn Translator>,
    pub export_dir: PathBuf,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(
        mailbox: Arc<dyn Mailbox>,
        primary: Arc<dyn Classifier>,
        secondary: Arc<dyn Classifier>,
        translator: Arc<dyn Translator>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            mailbox,
            primary,
            secondary,
            translator,
            export_dir,
        }
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::SearchMail { query, max_results } => {
                self.execute_search(query, *max_results).await
            }
            ToolCall::GetMessage { id } => self.execute_get_message(id).await,
            ToolCall::SendMessage { to, subject, body } => {
                self.execute_send(to, subject, body, false).await
            }
            ToolCall::CreateDraft { to, subject, body } => {
                self.execute_send(to, subject, body, true).await
            }
            ToolCall::ExportHtml { query, max_results } => {
                self.execute_export(query, *max_results).await
            }
            ToolCall::ClassifyText { text } => analyze(self.primary.as_ref(), text).await,
            ToolCall::CompareClassifiers { text } => {
                analyze_comparative(self.primary.as_ref(), self.secondary.as_ref(), text).await
            }
            ToolCall::TranslateEsEn { text } => {
                translate_text(self.translator.as_ref(), text).await
            }
        }
    }

    async fn execute_search(&self, query: &str, max_results: u32) -> Result<String> {
        if query.trim().is_empty() {
            return Err(AgnError::InvalidInput("query must not be empty".to_string()));
        }

        let summaries = self.mailbox.search(query, max_results).await?;

        if summaries.is_empty() {
            return Ok(format!("No messages found for query: '{}'", query));
        }

        let formatted = summaries
            .iter()
            .enumerate()
            .map(|(i, s)| {
                format!(
                    "Message {}:\n\
                     - id: {}\n\
                     - from: {}\n\
                     - subject: {}\n\
                     - preview: {}\n\
                     - thread: {}\n\
                     - date: {}",
                    i + 1,
                    s.id,
                    s.sender.as_deref().unwrap_or(MISSING_FIELD),
                    s.subject.as_deref().unwrap_or(MISSING_FIELD),
                    s.snippet.as_deref().unwrap_or(MISSING_FIELD),
                    s.thread_id.as_deref().unwrap_or(MISSING_FIELD),
                    s.date.as_deref().unwrap_or(MISSING_FIELD),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(format!(
            "Found {} messages for '{}':\n\n{}",
            summaries.len(),
            query,
            formatted
        ))
    }

    async fn execute_get_message(&self, id: &str) -> Result<String> {
        if id.trim().is_empty() {
            return Err(AgnError::InvalidInput(
                "message id must not be empty".to_string(),
            ));
        }

        let message = self.mailbox.get_message(id).await?;
        Ok(format_message(&message))
    }

    async fn execute_send(
        &self,
        to: &[String],
        subject: &str,
        body: &str,
        draft: bool,
    ) -> Result<String> {
        if body.trim().is_empty() {
            return Err(AgnError::InvalidInput(
                "message body must not be empty".to_string(),
            ));
        }
        validate_recipients(to)?;

        let outgoing = OutgoingMessage {
            to: to.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        if draft {
            let outcome = self.mailbox.create_draft(&outgoing).await?;
            Ok(format!("Draft created (id: {})", outcome.id))
        } else {
            let outcome = self.mailbox.send_message(&outgoing).await?;
            Ok(format!("Message sent (id: {})", outcome.id))
        }
    }

    async fn execute_export(&self, query: &str, max_results: u32) -> Result<String> {
        if query.trim().is_empty() {
            return Err(AgnError::InvalidInput("query must not be empty".to_string()));
        }

        let report = export_messages_as_html(
            self.mailbox.as_ref(),
            query,
            max_results,
            &self.export_dir,
        )
        .await?;

        Ok(report.render(query))
    }
}

/// Render a full message as a text block, with placeholders for missing
/// fields.
pub fn format_message(message: &MailMessage) -> String {
    let mut block = format!(
        "Message {}\n\
         - thread: {}\n\
         - from: {}\n\
         - subject: {}\n\
         - date: {}\n\
         - preview: {}\n\n\
         Body:\n{}",
        message.id,
        message.thread_id.as_deref().unwrap_or(MISSING_FIELD),
        message.sender.as_deref().unwrap_or(MISSING_FIELD),
        message.subject.as_deref().unwrap_or(MISSING_FIELD),
        message.date.as_deref().unwrap_or(MISSING_FIELD),
        message.snippet.as_deref().unwrap_or(MISSING_FIELD),
        message.body.as_deref().unwrap_or(MISSING_FIELD),
    );

    if message.attachments.is_empty() {
        block.push_str("\n\nNo attachments");
    } else {
        block.push_str("\n\nAttachments:");
        for attachment in &message.attachments {
            block.push_str(&format!(
                "\n- {} ({}, {} bytes)",
                attachment.filename, attachment.mime_type, attachment.size
            ));
        }
    }

    block
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    vec![
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "search_mail".to_string(),
                description: Some(
                    "Search the mailbox using provider query syntax \
                    (e.g. 'from:user@example.com', 'subject:invoice', 'in:inbox'). \
                    Returns message ids and summaries; use this first to find ids."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query (default: 'in:inbox')"
                        },
                        "max_results": {
                            "type": "integer",
                            "description": "Maximum number of results (default: 3)",
                            "default": 3
                        }
                    },
                    "required": []
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "get_message".to_string(),
                description: Some(
                    "Fetch the full content of one message by id, including sender, \
                    subject, body, and attachment list."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "id": {
                            "type": "string",
                            "description": "The message id"
                        }
                    },
                    "required": ["id"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "send_message".to_string(),
                description: Some(
                    "Send an email. This has an external side effect; calling it twice \
                    sends twice."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "to": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Recipient email addresses"
                        },
                        "subject": {
                            "type": "string",
                            "description": "Subject line"
                        },
                        "body": {
                            "type": "string",
                            "description": "Message body"
                        }
                    },
                    "required": ["to", "subject", "body"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "create_draft".to_string(),
                description: Some(
                    "Save an email as a draft without sending it.".to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "to": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "Recipient email addresses"
                        },
                        "subject": {
                            "type": "string",
                            "description": "Subject line"
                        },
                        "body": {
                            "type": "string",
                            "description": "Message body"
                        }
                    },
                    "required": ["to", "subject", "body"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "export_html".to_string(),
                description: Some(
                    "Export messages matching a query as HTML files on disk. \
                    Returns the list of files written and any failures."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query selecting messages to export"
                        },
                        "max_results": {
                            "type": "integer",
                            "description": "Maximum number of messages (default: 3)",
                            "default": 3
                        }
                    },
                    "required": ["query"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "classify_text".to_string(),
                description: Some(
                    "Analyze whether a text (email body, URL, SMS) is phishing. \
                    Returns the predicted label, confidence, and a risk level."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "text": {
                            "type": "string",
                            "description": "The text to analyze"
                        }
                    },
                    "required": ["text"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "compare_classifiers".to_string(),
                description: Some(
                    "Analyze a text with two independent phishing models and combine \
                    their verdicts. Use when a second opinion is needed."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "text": {
                            "type": "string",
                            "description": "The text to analyze"
                        }
                    },
                    "required": ["text"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "translate_es_en".to_string(),
                description: Some(
                    "Translate Spanish text to English. Use before phishing analysis \
                    when the message is in Spanish."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "text": {
                            "type": "string",
                            "description": "Spanish text to translate"
                        }
                    },
                    "required": ["text"]
                })),
                strict: None,
            },
        },
    ]
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| AgnError::Agent(format!("Invalid tool arguments: {}", e)))?;

    let require_text = |args: &serde_json::Value| -> Result<String> {
        args["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AgnError::Agent("Missing 'text' argument".to_string()))
    };

    let recipients = |args: &serde_json::Value| -> Result<Vec<String>> {
        args["to"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .ok_or_else(|| AgnError::Agent("Missing 'to' argument".to_string()))
    };

    match name {
        "search_mail" => {
            let query = args["query"]
                .as_str()
                .unwrap_or("in:inbox")
                .to_string();
            let max_results = args["max_results"].as_u64().unwrap_or(3) as u32;
            Ok(ToolCall::SearchMail { query, max_results })
        }
        "get_message" => {
            let id = args["id"]
                .as_str()
                .ok_or_else(|| AgnError::Agent("Missing 'id' argument".to_string()))?
                .to_string();
            Ok(ToolCall::GetMessage { id })
        }
        "send_message" | "create_draft" => {
            let to = recipients(&args)?;
            let subject = args["subject"]
                .as_str()
                .ok_or_else(|| AgnError::Agent("Missing 'subject' argument".to_string()))?
                .to_string();
            let body = args["body"]
                .as_str()
                .ok_or_else(|| AgnError::Agent("Missing 'body' argument".to_string()))?
                .to_string();

            if name == "send_message" {
                Ok(ToolCall::SendMessage { to, subject, body })
            } else {
                Ok(ToolCall::CreateDraft { to, subject, body })
            }
        }
        "export_html" => {
            let query = args["query"]
                .as_str()
                .ok_or_else(|| AgnError::Agent("Missing 'query' argument".to_string()))?
                .to_string();
            let max_results = args["max_results"].as_u64().unwrap_or(3) as u32;
            Ok(ToolCall::ExportHtml { query, max_results })
        }
        "classify_text" => Ok(ToolCall::ClassifyText {
            text: require_text(&args)?,
        }),
        "compare_classifiers" => Ok(ToolCall::CompareClassifiers {
            text: require_text(&args)?,
        }),
        "translate_es_en" => Ok(ToolCall::TranslateEsEn {
            text: require_text(&args)?,
        }),
        _ => Err(AgnError::Agent(format!("Unknown tool: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Verdict;
    use crate::mail::{MailMessage, MemoryMailbox, MessagePayload};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClassifier {
        verdict: Verdict,
        calls: AtomicUsize,
    }

    impl StubClassifier {
        fn new(phishing: bool, confidence: f64) -> Self {
            Self {
                verdict: Verdict {
                    phishing,
                    confidence,
                },
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl crate::classify::Classifier for StubClassifier {
        async fn classify(&self, _text: &str) -> crate::error::Result<Verdict> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.verdict)
        }

        fn model_id(&self) -> &str {
            "stub/model"
        }
    }

    struct StubTranslator;

    #[async_trait]
    impl crate::translate::Translator for StubTranslator {
        async fn translate(&self, _text: &str) -> crate::error::Result<String> {
            Ok("translated".to_string())
        }

        fn model_id(&self) -> &str {
            "stub/translator"
        }
    }

    fn sample_message(id: &str, body: &str) -> MailMessage {
        MailMessage {
            id: id.to_string(),
            thread_id: Some(format!("t-{}", id)),
            sender: Some("alice@example.com".to_string()),
            subject: Some("Account verification".to_string()),
            snippet: Some("Please verify".to_string()),
            body: Some(body.to_string()),
            date: Some("2024-01-15 12:00 UTC".to_string()),
            attachments: Vec::new(),
        }
    }

    fn context() -> (ToolContext, Arc<MemoryMailbox>) {
        let mailbox = Arc::new(MemoryMailbox::new());
        for i in 1..=3 {
            mailbox.insert(
                sample_message(&format!("m{}", i), "click here to verify your account"),
                MessagePayload::default(),
            );
        }

        let context = ToolContext::new(
            mailbox.clone(),
            Arc::new(StubClassifier::new(true, 0.95)),
            Arc::new(StubClassifier::new(true, 0.75)),
            Arc::new(StubTranslator),
            std::env::temp_dir().join("agn-tool-tests"),
        );
        (context, mailbox)
    }

    #[test]
    fn test_parse_search_tool() {
        let tool =
            parse_tool_call("search_mail", r#"{"query": "from:alice", "max_results": 5}"#).unwrap();
        match tool {
            ToolCall::SearchMail { query, max_results } => {
                assert_eq!(query, "from:alice");
                assert_eq!(max_results, 5);
            }
            _ => panic!("Expected SearchMail tool"),
        }
    }

    #[test]
    fn test_parse_search_defaults() {
        let tool = parse_tool_call("search_mail", "{}").unwrap();
        match tool {
            ToolCall::SearchMail { query, max_results } => {
                assert_eq!(query, "in:inbox");
                assert_eq!(max_results, 3);
            }
            _ => panic!("Expected SearchMail tool"),
        }
    }

    #[test]
    fn test_parse_send_tool() {
        let tool = parse_tool_call(
            "send_message",
            r#"{"to": ["bob@example.com"], "subject": "hi", "body": "there"}"#,
        )
        .unwrap();
        match tool {
            ToolCall::SendMessage { to, subject, body } => {
                assert_eq!(to, vec!["bob@example.com"]);
                assert_eq!(subject, "hi");
                assert_eq!(body, "there");
            }
            _ => panic!("Expected SendMessage tool"),
        }
    }

    #[test]
    fn test_parse_unknown_tool() {
        assert!(parse_tool_call("launch_missiles", "{}").is_err());
        assert!(parse_tool_call("get_message", "{}").is_err());
    }

    #[tokio::test]
    async fn test_search_and_get_and_classify_scenario() {
        let (context, _) = context();

        let search = context
            .execute(&ToolCall::SearchMail {
                query: "in:inbox".to_string(),
                max_results: 3,
            })
            .await
            .unwrap();
        assert!(search.contains("Found 3 messages"));
        assert!(search.contains("- id: m1"));

        let message = context
            .execute(&ToolCall::GetMessage {
                id: "m1".to_string(),
            })
            .await
            .unwrap();
        assert!(message.contains("from: alice@example.com"));
        assert!(message.contains("subject: Account verification"));
        assert!(message.contains("click here to verify your account"));

        let verdict = context
            .execute(&ToolCall::ClassifyText {
                text: "click here to verify your account".to_string(),
            })
            .await
            .unwrap();
        assert!(verdict.contains("Risk level: VERY HIGH"));
    }

    #[tokio::test]
    async fn test_blank_inputs_rejected_without_external_calls() {
        let (context, mailbox) = context();

        for tool in [
            ToolCall::SearchMail {
                query: "  ".to_string(),
                max_results: 3,
            },
            ToolCall::GetMessage { id: "".to_string() },
            ToolCall::ClassifyText {
                text: " \n".to_string(),
            },
            ToolCall::CompareClassifiers {
                text: "".to_string(),
            },
            ToolCall::TranslateEsEn {
                text: "\t".to_string(),
            },
            ToolCall::SendMessage {
                to: vec!["bob@example.com".to_string()],
                subject: "hi".to_string(),
                body: "   ".to_string(),
            },
            ToolCall::ExportHtml {
                query: "".to_string(),
                max_results: 3,
            },
        ] {
            assert!(
                matches!(context.execute(&tool).await, Err(AgnError::InvalidInput(_))),
                "expected invalid-input rejection for {:?}",
                tool
            );
        }

        assert_eq!(mailbox.outgoing_count(), 0);
    }

    #[tokio::test]
    async fn test_send_validates_recipients() {
        let (context, mailbox) = context();

        let result = context
            .execute(&ToolCall::SendMessage {
                to: vec!["not-an-address".to_string()],
                subject: "hi".to_string(),
                body: "there".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AgnError::InvalidInput(_))));
        assert_eq!(mailbox.outgoing_count(), 0);
    }

    #[tokio::test]
    async fn test_send_and_draft_report_ids() {
        let (context, _) = context();

        let sent = context
            .execute(&ToolCall::SendMessage {
                to: vec!["bob@example.com".to_string()],
                subject: "hi".to_string(),
                body: "there".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(sent, "Message sent (id: sent-1)");

        let draft = context
            .execute(&ToolCall::CreateDraft {
                to: vec!["bob@example.com".to_string()],
                subject: "hi".to_string(),
                body: "there".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(draft, "Draft created (id: draft-2)");
    }

    #[tokio::test]
    async fn test_compare_classifiers_reports_combined_level() {
        let (context, _) = context();

        let report = context
            .execute(&ToolCall::CompareClassifiers {
                text: "urgent wire transfer".to_string(),
            })
            .await
            .unwrap();

        // 95% and 75%, both flagged.
        assert!(report.contains("Risk level: CRITICAL"));
    }

    #[test]
    fn test_format_message_placeholders() {
        let message = MailMessage {
            id: "m1".to_string(),
            thread_id: None,
            sender: None,
            subject: None,
            snippet: None,
            body: None,
            date: None,
            attachments: Vec::new(),
        };

        let block = format_message(&message);
        assert!(block.contains("- from: not available"));
        assert!(block.contains("Body:\nnot available"));
        assert!(block.contains("No attachments"));
    }

    #[test]
    fn test_tool_definitions_cover_all_tools() {
        let names: Vec<String> = tool_definitions()
            .into_iter()
            .map(|t| t.function.name)
            .collect();

        for expected in [
            "search_mail",
            "get_message",
            "send_message",
            "create_draft",
            "export_html",
            "classify_text",
            "compare_classifiers",
            "translate_es_en",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {}", expected);
        }
    }
}
