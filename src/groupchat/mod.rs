//! Group conversations coordinated by a manager that picks each next speaker.

use std::sync::Arc;

use regex::Regex;
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::agent::{
    ChatEvent, ChatMessage, ChatOptions, ChatResult, ConversableAgent, ReplyOutcome, TerminationReason,
};
use crate::config::LlmConfig;
use crate::error::{Result, WorkbenchError};
use crate::provider::{self, ModelProvider, ProviderRequest};
use crate::termination::{ExactTerminate, TerminationCondition};
use crate::types::{GenerationSettings, ModelMessage, Usage};

/// Default number of messages in a group chat, opening message included.
pub const DEFAULT_MAX_ROUND: usize = 10;

/// Name the manager uses as the recipient of every group message.
pub const DEFAULT_MANAGER_NAME: &str = "chat_manager";

/// How the manager picks the next speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SpeakerSelection {
    /// Ask the manager's model, falling back to round-robin.
    #[default]
    Auto,
    RoundRobin,
}

/// Participants and shared transcript of a group conversation.
#[derive(Debug)]
pub struct GroupChat {
    agents: Vec<ConversableAgent>,
    messages: Vec<ChatMessage>,
    max_round: usize,
    speaker_selection: SpeakerSelection,
}

impl GroupChat {
    pub fn new(agents: Vec<ConversableAgent>) -> Self {
        Self {
            agents,
            messages: Vec::new(),
            max_round: DEFAULT_MAX_ROUND,
            speaker_selection: SpeakerSelection::default(),
        }
    }

    pub fn with_max_round(mut self, max_round: usize) -> Self {
        self.max_round = max_round;
        self
    }

    pub fn with_speaker_selection(mut self, selection: SpeakerSelection) -> Self {
        self.speaker_selection = selection;
        self
    }

    pub fn agents(&self) -> &[ConversableAgent] {
        &self.agents
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(ConversableAgent::name).collect()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn max_round(&self) -> usize {
        self.max_round
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.agents.iter().position(|a| a.name() == name)
    }

    fn next_in_order(&self, last: usize) -> usize {
        (last + 1) % self.agents.len()
    }

    /// Roster lines `"<name>: <description>"` used in selection prompts.
    fn roles(&self) -> String {
        self.agents
            .iter()
            .map(|a| format!("{}: {}", a.name(), a.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Member named most often in `answer`; ties go to roster order.
    fn match_speaker(&self, answer: &str) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (idx, agent) in self.agents.iter().enumerate() {
            let mentions = count_mentions(answer, agent.name());
            if mentions > 0 && best.map_or(true, |(_, count)| mentions > count) {
                best = Some((idx, mentions));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

/// Whole-word occurrences of `name` in `text`.
fn count_mentions(text: &str, name: &str) -> usize {
    if name.is_empty() {
        return 0;
    }
    let edge = |c: Option<char>| match c {
        Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
        _ => "",
    };
    let pattern = format!(
        "{}{}{}",
        edge(name.chars().next()),
        regex::escape(name),
        edge(name.chars().last())
    );
    match Regex::new(&pattern) {
        Ok(re) => re.find_iter(text).count(),
        Err(e) => {
            warn!(agent = %name, error = %e, "Could not build mention pattern");
            0
        }
    }
}

#[derive(Clone)]
struct ManagerModel {
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
}

/// Runs a [`GroupChat`]: relays messages and selects speakers.
pub struct GroupChatManager {
    name: String,
    groupchat: GroupChat,
    llm: Option<ManagerModel>,
    termination: Arc<dyn TerminationCondition>,
}

impl GroupChatManager {
    /// Manager that selects speakers with the model described by `config`.
    pub fn new(groupchat: GroupChat, config: &LlmConfig) -> Self {
        Self::with_provider(groupchat, provider::create_provider(config), provider::settings_for(config))
    }

    pub fn with_provider(groupchat: GroupChat, provider: Arc<dyn ModelProvider>, settings: GenerationSettings) -> Self {
        Self {
            name: DEFAULT_MANAGER_NAME.to_string(),
            groupchat,
            llm: Some(ManagerModel { provider, settings }),
            termination: Arc::new(ExactTerminate),
        }
    }

    /// Manager without a model; `Auto` selection degrades to round-robin.
    pub fn without_llm(groupchat: GroupChat) -> Self {
        Self {
            name: DEFAULT_MANAGER_NAME.to_string(),
            groupchat,
            llm: None,
            termination: Arc::new(ExactTerminate),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_termination(mut self, condition: impl TerminationCondition + 'static) -> Self {
        self.termination = Arc::new(condition);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn groupchat(&self) -> &GroupChat {
        &self.groupchat
    }

    pub async fn initiate_chat(&mut self, from: &str, message: impl Into<String>) -> Result<ChatResult> {
        self.initiate_chat_with(from, message, &ChatOptions::default()).await
    }

    /// Open the conversation with `message` from member `from`, then let
    /// selected speakers reply until one declines or `max_round` messages exist.
    pub async fn initiate_chat_with(
        &mut self,
        from: &str,
        message: impl Into<String>,
        options: &ChatOptions,
    ) -> Result<ChatResult> {
        let Some(mut last_speaker) = self.groupchat.index_of(from) else {
            return Err(WorkbenchError::UnknownAgent(from.to_string()));
        };
        if self.groupchat.max_round == 0 {
            return Err(WorkbenchError::Configuration("max_round must be at least 1".into()));
        }

        for agent in &mut self.groupchat.agents {
            agent.reset_consecutive_auto_reply_counter();
        }
        self.groupchat.messages.clear();
        info!(from, members = self.groupchat.agents.len(), max_round = self.groupchat.max_round, "Starting group chat");

        let mut usage = Usage::default();
        let mut next = ChatMessage::text(from, self.name.clone(), message);

        let termination = loop {
            options.emit(ChatEvent::Message(next.clone()));
            self.groupchat.messages.push(next);

            if self.groupchat.messages.last().is_some_and(|m| self.termination.is_termination(m)) {
                break TerminationReason::TerminationMessage {
                    agent: self.name.clone(),
                };
            }
            if self.groupchat.messages.len() >= self.groupchat.max_round {
                break TerminationReason::MaxRound;
            }

            let speaker = self.select_speaker(last_speaker, &mut usage).await?;
            let speaker_name = self.groupchat.agents[speaker].name().to_string();
            options.emit(ChatEvent::SpeakerSelected {
                name: speaker_name.clone(),
            });

            let outcome = self.groupchat.agents[speaker]
                .generate_reply(&self.groupchat.messages, &self.name)
                .await?;
            match outcome {
                ReplyOutcome::Terminated(reason) => break reason,
                ReplyOutcome::Reply(reply) => {
                    usage.merge(&reply.usage);
                    next = ChatMessage::new(speaker_name, self.name.clone(), reply.parts);
                    last_speaker = speaker;
                }
            }
        };

        debug!(%termination, messages = self.groupchat.messages.len(), "Group chat finished");
        options.emit(ChatEvent::Finished(termination.clone()));
        Ok(ChatResult {
            messages: self.groupchat.messages.clone(),
            usage,
            termination,
        })
    }

    async fn select_speaker(&self, last_speaker: usize, usage: &mut Usage) -> Result<usize> {
        let fallback = self.groupchat.next_in_order(last_speaker);
        let model = match (&self.groupchat.speaker_selection, &self.llm) {
            (SpeakerSelection::Auto, Some(model)) if self.groupchat.agents.len() > 1 => model,
            _ => return Ok(fallback),
        };

        let names = self.groupchat.agent_names().join(", ");
        let mut messages = Vec::with_capacity(self.groupchat.messages.len() + 2);
        messages.push(ModelMessage::system(format!(
            "You coordinate a group conversation. The participants are:\n{}\n\n\
             Read the conversation, then choose who should speak next from [{names}]. \
             Respond with ONLY the participant name.",
            self.groupchat.roles()
        )));
        messages.extend(self.groupchat.messages.iter().map(|m| m.to_model_message(&self.name)));
        messages.push(ModelMessage::user(format!(
            "Read the above conversation. Then select the next speaker from [{names}]. Only return the name."
        )));

        let request = ProviderRequest {
            messages,
            settings: model.settings.clone(),
            tools: None,
        };
        let response = model.provider.generate_text(&request).await?;
        usage.merge(&response.usage);

        match self.groupchat.match_speaker(&response.text) {
            Some(idx) => {
                debug!(speaker = %self.groupchat.agents[idx].name(), "Speaker selected");
                Ok(idx)
            }
            None => {
                warn!(answer = %response.text, "Selection named no participant, using round-robin");
                Ok(fallback)
            }
        }
    }
}

impl std::fmt::Debug for GroupChatManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupChatManager")
            .field("name", &self.name)
            .field("groupchat", &self.groupchat)
            .field("has_llm", &self.llm.is_some())
            .finish()
    }
}
