//! Workbench: small multi-agent LLM conversations.
//!
//! Agents with a persona prompt talk to each other (two-party or in a group
//! moderated by a manager), call registered tools such as the currency
//! calculator, or execute code blocks they receive, until a termination
//! predicate fires.
//!
//! # Quick Start
//!
//! ```no_run
//! use workbench::prelude::*;
//!
//! # async fn example() -> workbench::error::Result<()> {
//! let config = LlmConfig::from_env("API_KEY")?;
//! let mut joseph = ConversableAgent::assistant("Joseph", &config).with_termination(ContainsTerminate);
//! let mut maria = ConversableAgent::assistant("Maria", &config).with_termination(ContainsTerminate);
//! let result = joseph.initiate_chat(&mut maria, "Hi! What's your name?").await?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod code_execution;
pub mod config;
pub mod error;
pub mod groupchat;
pub mod prelude;
pub mod provider;
pub mod termination;
pub mod tools;
pub mod types;
