//! Agent system for phishing triage with tool calling.
//!
//! Provides an LLM agent that can search the mailbox, fetch and classify
//! messages, translate Spanish text, and send or draft replies, driven by
//! a hosted chat model selecting tools.

mod runner;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{format_message, parse_tool_call, tool_definitions, ToolCall, ToolContext};
