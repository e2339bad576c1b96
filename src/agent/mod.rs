//! Agents and two-party conversations.

pub mod agent;
pub mod conversation;
pub mod message;

pub use agent::{ConversableAgent, DEFAULT_ASSISTANT_SYSTEM_MESSAGE, MAX_CONSECUTIVE_AUTO_REPLY};
pub use conversation::{
    AgentReply, ChatEvent, ChatOptions, ChatResult, EventSink, ReplyOutcome, TerminationReason,
};
pub use message::ChatMessage;
