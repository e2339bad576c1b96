//! Two-party conversations and their results.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::types::{ContentPart, Usage};

use super::agent::ConversableAgent;
use super::message::ChatMessage;

/// Why a conversation stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// `agent` received a message its termination predicate accepted.
    TerminationMessage { agent: String },
    /// `agent` reached its consecutive auto-reply limit.
    MaxConsecutiveAutoReply { agent: String },
    /// The caller's turn limit was reached.
    MaxTurns,
    /// The group chat round limit was reached.
    MaxRound,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TerminationMessage { agent } => write!(f, "{agent} received a termination message"),
            Self::MaxConsecutiveAutoReply { agent } => write!(f, "{agent} reached its auto-reply limit"),
            Self::MaxTurns => write!(f, "turn limit reached"),
            Self::MaxRound => write!(f, "round limit reached"),
        }
    }
}

/// Content and token usage of a single reply.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub parts: Vec<ContentPart>,
    pub usage: Usage,
}

impl AgentReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Text { text: text.into() }],
            usage: Usage::default(),
        }
    }
}

/// What an agent does when asked to reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    Reply(AgentReply),
    Terminated(TerminationReason),
}

/// Progress notifications emitted while a conversation runs.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A message was appended to the transcript.
    Message(ChatMessage),
    /// A group chat manager picked the next speaker.
    SpeakerSelected { name: String },
    /// The conversation ended.
    Finished(TerminationReason),
}

pub type EventSink = Arc<dyn Fn(ChatEvent) + Send + Sync>;

/// Knobs for a single conversation.
#[derive(Clone, Default)]
pub struct ChatOptions {
    /// Maximum number of replies after the opening message. Two-party chats only.
    pub max_turns: Option<usize>,
    pub event_sink: Option<EventSink>,
}

impl ChatOptions {
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub(crate) fn emit(&self, event: ChatEvent) {
        if let Some(sink) = &self.event_sink {
            sink(event);
        }
    }
}

impl std::fmt::Debug for ChatOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOptions")
            .field("max_turns", &self.max_turns)
            .field("event_sink", &self.event_sink.is_some())
            .finish()
    }
}

/// Outcome of a finished conversation.
#[derive(Debug, Clone)]
pub struct ChatResult {
    pub messages: Vec<ChatMessage>,
    pub usage: Usage,
    pub termination: TerminationReason,
}

impl ChatResult {
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Content of the last message.
    pub fn summary(&self) -> String {
        self.last_message().map(ChatMessage::content).unwrap_or_default()
    }
}

impl ConversableAgent {
    /// Send `message` to `recipient` and let the two agents reply to each
    /// other until one of them declines.
    pub async fn initiate_chat(&mut self, recipient: &mut ConversableAgent, message: impl Into<String>) -> Result<ChatResult> {
        self.initiate_chat_with(recipient, message, &ChatOptions::default())
            .await
    }

    pub async fn initiate_chat_with(
        &mut self,
        recipient: &mut ConversableAgent,
        message: impl Into<String>,
        options: &ChatOptions,
    ) -> Result<ChatResult> {
        self.reset_consecutive_auto_reply_counter();
        recipient.reset_consecutive_auto_reply_counter();
        info!(sender = %self.name(), recipient = %recipient.name(), "Starting chat");

        let mut sender: &mut ConversableAgent = self;
        let mut receiver: &mut ConversableAgent = recipient;
        let mut messages: Vec<ChatMessage> = Vec::new();
        let mut usage = Usage::default();
        let mut next = ChatMessage::text(sender.name(), receiver.name(), message);
        let mut turns = 0usize;

        let termination = loop {
            options.emit(ChatEvent::Message(next.clone()));
            messages.push(next);

            if options.max_turns.is_some_and(|max| turns >= max) {
                break TerminationReason::MaxTurns;
            }

            match receiver.generate_reply(&messages, sender.name()).await? {
                ReplyOutcome::Terminated(reason) => break reason,
                ReplyOutcome::Reply(reply) => {
                    usage.merge(&reply.usage);
                    next = ChatMessage::new(receiver.name(), sender.name(), reply.parts);
                    std::mem::swap(&mut sender, &mut receiver);
                    turns += 1;
                }
            }
        };

        debug!(%termination, messages = messages.len(), "Chat finished");
        options.emit(ChatEvent::Finished(termination.clone()));
        Ok(ChatResult {
            messages,
            usage,
            termination,
        })
    }
}
