//! Model configuration loaded once from the environment.

use std::fmt;

use bon::Builder;

use crate::error::{Result, WorkbenchError};

/// Environment variable holding the model identifier.
pub const MODEL_VAR: &str = "MODEL";

/// Environment variable overriding the Chat Completions endpoint.
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Shared model configuration handed to every LLM-backed agent.
///
/// Built once at process start and never mutated afterwards; agents clone it.
#[derive(Clone, PartialEq, Builder)]
pub struct LlmConfig {
    #[builder(into)]
    pub model: String,
    #[builder(into)]
    pub api_key: String,
    #[builder(into)]
    pub base_url: Option<String>,
    pub temperature: Option<f64>,
    /// Enables the on-disk response cache under `.cache/<seed>/`.
    pub cache_seed: Option<u64>,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("api_key", &"..")
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("cache_seed", &self.cache_seed)
            .finish()
    }
}

impl LlmConfig {
    /// Load `.env` (if present) and read `MODEL`, `api_key_var` and `OPENAI_BASE_URL`.
    pub fn from_env(api_key_var: &str) -> Result<Self> {
        let _ = dotenvy::dotenv(); // .env is optional, real env vars still apply
        Self::from_lookup(api_key_var, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(api_key_var: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model = required(&lookup, MODEL_VAR)?;
        let api_key = required(&lookup, api_key_var)?;
        let base_url = lookup(BASE_URL_VAR).filter(|url| !url.trim().is_empty());

        Ok(Self {
            model,
            api_key,
            base_url,
            temperature: None,
            cache_seed: None,
        })
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the cache seed.
    pub fn with_cache_seed(mut self, seed: u64) -> Self {
        self.cache_seed = Some(seed);
        self
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| WorkbenchError::Configuration(format!("missing environment variable {key}")))
}
