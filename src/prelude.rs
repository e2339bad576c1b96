//! Convenience re-exports for common use.

pub use crate::agent::{ChatMessage, ChatOptions, ChatResult, ConversableAgent, TerminationReason};
pub use crate::code_execution::CodeExecutionConfig;
pub use crate::config::LlmConfig;
pub use crate::error::{Result, WorkbenchError};
pub use crate::groupchat::{GroupChat, GroupChatManager, SpeakerSelection};
pub use crate::provider::ModelProvider;
pub use crate::termination::{
    ContainsTerminate, EndsWithTerminate, ExactTerminate, TerminationCondition, TERMINATE,
};
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments};
pub use crate::types::{ContentPart, GenerationSettings, ModelMessage, Role, Usage};
