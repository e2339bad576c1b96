//! Conversable agent: replies to peers via tools, code execution, or a model.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::code_execution::{self, CodeExecutionConfig};
use crate::config::LlmConfig;
use crate::error::Result;
use crate::provider::{self, ModelProvider, ProviderRequest, ToolDefinition};
use crate::termination::{ExactTerminate, TerminationCondition};
use crate::tools::{Tool, ToolArguments, ToolExecutionContext};
use crate::types::*;

use super::conversation::{AgentReply, ReplyOutcome, TerminationReason};
use super::message::ChatMessage;

/// Default cap on consecutive automatic replies to the same peer.
pub const MAX_CONSECUTIVE_AUTO_REPLY: usize = 100;

/// System prompt for assistants that are not given one.
pub const DEFAULT_ASSISTANT_SYSTEM_MESSAGE: &str = "You are a helpful AI assistant. \
Solve tasks using your language skills and the functions you have been given. \
When a task needs computation or data you do not have, write a complete Python or shell \
script in a fenced code block for the user to execute, and wait for its output before \
continuing. Use one code block per reply and do not ask the user to edit the code. \
If the result shows an error, fix it and send the corrected code. \
Reply \"TERMINATE\" at the end when everything is done.";

/// Model backend attached to an agent.
#[derive(Clone)]
struct LlmBackend {
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
}

/// A named conversation participant.
pub struct ConversableAgent {
    name: String,
    system_message: String,
    description: Option<String>,
    llm: Option<LlmBackend>,
    termination: Arc<dyn TerminationCondition>,
    llm_tools: Vec<Arc<dyn Tool>>,
    function_map: Vec<Arc<dyn Tool>>,
    code_execution: Option<CodeExecutionConfig>,
    max_consecutive_auto_reply: usize,
    consecutive_replies: HashMap<String, usize>,
    default_auto_reply: String,
}

impl ConversableAgent {
    /// Bare agent: no model, no code execution, stops only on an exact `TERMINATE`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_message: String::new(),
            description: None,
            llm: None,
            termination: Arc::new(ExactTerminate),
            llm_tools: Vec::new(),
            function_map: Vec::new(),
            code_execution: None,
            max_consecutive_auto_reply: MAX_CONSECUTIVE_AUTO_REPLY,
            consecutive_replies: HashMap::new(),
            default_auto_reply: String::new(),
        }
    }

    /// Model-backed assistant with the default system prompt.
    pub fn assistant(name: impl Into<String>, config: &LlmConfig) -> Self {
        Self::new(name)
            .with_system_message(DEFAULT_ASSISTANT_SYSTEM_MESSAGE)
            .with_llm(config)
    }

    /// Model-less proxy that executes code blocks it receives.
    pub fn user_proxy(name: impl Into<String>) -> Self {
        Self::new(name).with_code_execution(Some(CodeExecutionConfig::default()))
    }

    pub fn with_system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = system_message.into();
        self
    }

    /// Short description used by group speaker selection; defaults to the system message.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach the model described by `config`.
    pub fn with_llm(self, config: &LlmConfig) -> Self {
        self.with_provider(provider::create_provider(config), provider::settings_for(config))
    }

    /// Attach an explicit provider.
    pub fn with_provider(mut self, provider: Arc<dyn ModelProvider>, settings: GenerationSettings) -> Self {
        self.llm = Some(LlmBackend { provider, settings });
        self
    }

    pub fn with_termination(mut self, condition: impl TerminationCondition + 'static) -> Self {
        self.termination = Arc::new(condition);
        self
    }

    pub fn with_code_execution(mut self, config: Option<CodeExecutionConfig>) -> Self {
        self.code_execution = config;
        self
    }

    pub fn with_max_consecutive_auto_reply(mut self, max: usize) -> Self {
        self.max_consecutive_auto_reply = max;
        self
    }

    pub fn with_default_auto_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_auto_reply = reply.into();
        self
    }

    /// Advertise `tool` to this agent's model.
    pub fn register_for_llm(mut self, tool: Arc<dyn Tool>) -> Self {
        self.llm_tools.push(tool);
        self
    }

    /// Allow this agent to execute `tool` when a peer calls it.
    pub fn register_for_execution(mut self, tool: Arc<dyn Tool>) -> Self {
        self.function_map.push(tool);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.system_message)
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub fn is_termination(&self, message: &ChatMessage) -> bool {
        self.termination.is_termination(message)
    }

    /// Forget consecutive-reply counts, as at the start of a new chat.
    pub fn reset_consecutive_auto_reply_counter(&mut self) {
        self.consecutive_replies.clear();
    }

    /// Reply to the last message of `history`, received from `peer`.
    ///
    /// Tries, in order: termination check, tool execution, code execution,
    /// model reply, default auto reply.
    pub async fn generate_reply(&mut self, history: &[ChatMessage], peer: &str) -> Result<ReplyOutcome> {
        let last = history.last();

        if let Some(message) = last {
            if self.termination.is_termination(message) {
                debug!(agent = %self.name, "Termination message received");
                return Ok(ReplyOutcome::Terminated(TerminationReason::TerminationMessage {
                    agent: self.name.clone(),
                }));
            }
        }

        let count = self.consecutive_replies.get(peer).copied().unwrap_or(0);
        if count >= self.max_consecutive_auto_reply {
            return Ok(ReplyOutcome::Terminated(TerminationReason::MaxConsecutiveAutoReply {
                agent: self.name.clone(),
            }));
        }

        let reply = match self.try_tool_calls(last, peer).await {
            Some(reply) => reply,
            None => match self.try_code_execution(last).await? {
                Some(reply) => reply,
                None => match self.try_llm(history).await? {
                    Some(reply) => reply,
                    None => AgentReply::text(self.default_auto_reply.clone()),
                },
            },
        };

        *self.consecutive_replies.entry(peer.to_string()).or_default() += 1;
        Ok(ReplyOutcome::Reply(reply))
    }

    async fn try_tool_calls(&self, last: Option<&ChatMessage>, peer: &str) -> Option<AgentReply> {
        let calls = last?.tool_calls();
        if calls.is_empty() {
            return None;
        }

        let ctx = ToolExecutionContext {
            executor: self.name.clone(),
            caller: peer.to_string(),
        };
        let mut parts = Vec::with_capacity(calls.len());
        for call in calls {
            let result = match self.function_map.iter().find(|t| t.name() == call.name) {
                Some(tool) => match tool.execute(&ToolArguments::new(call.arguments.clone()), &ctx).await {
                    Ok(value) => AgentToolResult {
                        tool_call_id: call.id.clone(),
                        result: value,
                        is_error: false,
                    },
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "Tool execution failed");
                        AgentToolResult {
                            tool_call_id: call.id.clone(),
                            result: serde_json::Value::String(format!("Error: {e}")),
                            is_error: true,
                        }
                    }
                },
                None => {
                    warn!(tool = %call.name, agent = %self.name, "Tool not registered for execution");
                    AgentToolResult {
                        tool_call_id: call.id.clone(),
                        result: serde_json::Value::String(format!("Error: Function {} not found.", call.name)),
                        is_error: true,
                    }
                }
            };
            parts.push(ContentPart::ToolResult(result));
        }

        Some(AgentReply {
            parts,
            usage: Usage::default(),
        })
    }

    async fn try_code_execution(&self, last: Option<&ChatMessage>) -> Result<Option<AgentReply>> {
        let (Some(config), Some(message)) = (self.code_execution.as_ref(), last) else {
            return Ok(None);
        };
        let blocks = code_execution::extract_code_blocks(&message.content());
        if blocks.is_empty() {
            return Ok(None);
        }

        debug!(agent = %self.name, blocks = blocks.len(), "Executing code blocks");
        let outcome = code_execution::execute_code_blocks(config, &blocks).await?;
        Ok(Some(AgentReply::text(outcome.to_reply())))
    }

    async fn try_llm(&self, history: &[ChatMessage]) -> Result<Option<AgentReply>> {
        let Some(backend) = self.llm.as_ref() else {
            return Ok(None);
        };

        let mut messages = Vec::with_capacity(history.len() + 1);
        if !self.system_message.is_empty() {
            messages.push(ModelMessage::system(self.system_message.clone()));
        }
        messages.extend(history.iter().map(|m| m.to_model_message(&self.name)));

        let tools: Option<Vec<ToolDefinition>> = if self.llm_tools.is_empty() {
            None
        } else {
            Some(self.llm_tools.iter().map(|t| t.definition()).collect())
        };

        let request = ProviderRequest {
            messages,
            settings: backend.settings.clone(),
            tools,
        };

        debug!(agent = %self.name, model = backend.provider.model_id(), "Requesting model reply");
        let response = backend.provider.generate_text(&request).await?;

        let mut parts = Vec::with_capacity(response.tool_calls.len() + 1);
        if !response.text.is_empty() || response.tool_calls.is_empty() {
            parts.push(ContentPart::Text {
                text: response.text,
            });
        }
        parts.extend(response.tool_calls.into_iter().map(ContentPart::ToolCall));

        Ok(Some(AgentReply {
            parts,
            usage: response.usage,
        }))
    }
}

impl std::fmt::Debug for ConversableAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversableAgent")
            .field("name", &self.name)
            .field("has_llm", &self.llm.is_some())
            .field("llm_tools", &self.llm_tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("function_map", &self.function_map.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("code_execution", &self.code_execution)
            .finish()
    }
}
