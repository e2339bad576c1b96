//! Shared test helpers and mock provider.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use workbench::error::WorkbenchError;
use workbench::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use workbench::types::*;

/// A mock provider that returns canned responses in order and records requests.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(model_id: &str) -> Arc<Self> {
        Arc::new(Self::new(model_id))
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            tool_calls: vec![],
        });
    }

    /// Queue a tool call response.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.responses.lock().unwrap().push(ProviderResponse {
            text: String::new(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            },
            tool_calls: vec![AgentToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
            }],
        });
    }

    /// Queue one response carrying several tool calls.
    pub fn queue_tool_calls(&self, calls: &[(&str, &str, serde_json::Value)]) {
        self.responses.lock().unwrap().push(ProviderResponse {
            text: String::new(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 10,
                total_tokens: 20,
            },
            tool_calls: calls
                .iter()
                .map(|(id, name, args)| AgentToolCall {
                    id: id.to_string(),
                    name: name.to_string(),
                    arguments: args.clone(),
                })
                .collect(),
        });
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, WorkbenchError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(ProviderResponse {
                text: "Mock response".to_string(),
                usage: Usage::default(),
                tool_calls: vec![],
            });
        }
        Ok(responses.remove(0))
    }
}

/// A provider that always fails with the given status.
pub struct FailingProvider {
    pub status: u16,
}

#[async_trait]
impl ModelProvider for FailingProvider {
    fn model_id(&self) -> &str {
        "failing"
    }

    async fn generate_text(&self, _request: &ProviderRequest) -> Result<ProviderResponse, WorkbenchError> {
        Err(WorkbenchError::api(self.status, "boom"))
    }
}
