//! Shared plumbing for the session binaries.

use std::io::Write;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::agent::{ChatEvent, ChatOptions, ChatResult, ConversableAgent, EventSink};
use crate::config::LlmConfig;
use crate::error::{Result, WorkbenchError};
use crate::termination::ContainsTerminate;

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG` (default `warn`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second install (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Sink that prints each transcript message to stdout as it is produced.
pub fn transcript_printer() -> EventSink {
    Arc::new(|event: ChatEvent| match event {
        ChatEvent::Message(message) => {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{message}");
            let _ = out.flush();
        }
        ChatEvent::SpeakerSelected { name } => {
            println!("\nNext speaker: {name}\n");
        }
        ChatEvent::Finished(reason) => {
            tracing::info!(%reason, "Conversation finished");
        }
    })
}

/// Options every session binary runs with.
pub fn session_options() -> ChatOptions {
    ChatOptions::default().with_event_sink(transcript_printer())
}

/// Report the outcome of a session and exit non-zero on failure.
pub fn finish(result: Result<ChatResult>) {
    match result {
        Ok(result) => {
            let usage = result.usage;
            tracing::info!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                termination = %result.termination,
                "Session complete"
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            if let WorkbenchError::Configuration(_) = e {
                eprintln!("Set MODEL and the API key variable in the environment or in a .env file.");
            } else if e.is_provider_error() {
                eprintln!("The model provider rejected the request; check the key, model name and base URL.");
            }
            std::process::exit(1);
        }
    }
}

/// Role-play participant that introduces itself and says `TERMINATE` once `closing` holds.
pub fn persona(name: &str, closing: &str, config: &LlmConfig) -> ConversableAgent {
    ConversableAgent::new(name)
        .with_system_message(format!(
            "You are a person called {name}. You will present yourself and you will ask the other part \
             to present themselves. You will not present yourself as an AI model. \
             You will say TERMINATE if {closing}."
        ))
        .with_termination(ContainsTerminate)
        .with_llm(config)
}
