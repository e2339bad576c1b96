//! Model provider trait and implementations.

pub mod cache;
pub mod http;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::WorkbenchError;
use crate::types::{message::AgentToolCall, GenerationSettings, ModelMessage, Usage};

pub use cache::CachedProvider;
pub use openai::OpenAiProvider;

/// A request sent to a model provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
}

/// Core trait implemented by all model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate a single completion.
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, WorkbenchError>;
}

/// Create the provider described by `config`, wrapped in the response cache when a seed is set.
pub fn create_provider(config: &LlmConfig) -> Arc<dyn ModelProvider> {
    let provider = OpenAiProvider::new(
        config.model.clone(),
        config.api_key.clone(),
        config.base_url.clone(),
    );
    match config.cache_seed {
        Some(seed) => Arc::new(CachedProvider::new(provider, cache::default_cache_dir(seed))),
        None => Arc::new(provider),
    }
}

/// Generation settings implied by a model configuration.
pub fn settings_for(config: &LlmConfig) -> GenerationSettings {
    GenerationSettings {
        temperature: config.temperature,
    }
}
