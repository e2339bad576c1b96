//! Messages exchanged between agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AgentToolCall, AgentToolResult, ContentPart, ModelMessage, Role};

/// One entry of a conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub recipient: String,
    pub parts: Vec<ContentPart>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, parts: Vec<ContentPart>) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            parts,
            timestamp: Utc::now(),
        }
    }

    /// Plain text message.
    pub fn text(sender: impl Into<String>, recipient: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(sender, recipient, vec![ContentPart::Text { text: text.into() }])
    }

    /// Textual content. Tool results render as their outputs separated by blank lines.
    pub fn content(&self) -> String {
        let results = self.tool_results();
        if !results.is_empty() {
            return results
                .iter()
                .map(|r| r.content_text())
                .collect::<Vec<_>>()
                .join("\n\n");
        }
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn tool_calls(&self) -> Vec<&AgentToolCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::ToolCall(tc) => Some(tc),
                _ => None,
            })
            .collect()
    }

    pub fn tool_results(&self) -> Vec<&AgentToolResult> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::ToolResult(tr) => Some(tr),
                _ => None,
            })
            .collect()
    }

    /// This message as seen by `viewer` in a model request.
    ///
    /// The viewer's own messages are `assistant`, tool results are `tool`, and
    /// everything else is `user` tagged with the sender's name.
    pub fn to_model_message(&self, viewer: &str) -> ModelMessage {
        let role = if !self.tool_results().is_empty() {
            Role::Tool
        } else if self.sender == viewer {
            Role::Assistant
        } else {
            Role::User
        };
        // Tool calls addressed to someone else are only text to the viewer.
        let content = if role == Role::User && !self.tool_calls().is_empty() {
            vec![ContentPart::Text {
                text: self.to_string(),
            }]
        } else {
            self.parts.clone()
        };
        ModelMessage {
            role,
            content,
            name: Some(self.sender.clone()),
        }
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} (to {}):", self.sender, self.recipient)?;
        writeln!(f)?;
        let text = self.content();
        if !text.is_empty() {
            writeln!(f, "{text}")?;
        }
        for call in self.tool_calls() {
            writeln!(f, "***** Suggested tool call ({}): {} *****", call.id, call.name)?;
            writeln!(f, "Arguments: {}", call.arguments)?;
        }
        write!(f, "{}", "-".repeat(80))
    }
}
