//! Three people introduce themselves in a managed group chat.

use workbench::cli;
use workbench::config::LlmConfig;
use workbench::error::Result;
use workbench::groupchat::{GroupChat, GroupChatManager};

const CLOSING: &str = "all the parts have presented themselves";

#[tokio::main]
async fn main() {
    cli::init_logging();
    cli::finish(run().await);
}

async fn run() -> Result<workbench::agent::ChatResult> {
    let config = LlmConfig::from_env("OPENAI_KEY")?.with_temperature(0.0).with_cache_seed(0);

    let agents = ["Joseph", "Maria", "Henry"]
        .into_iter()
        .map(|name| cli::persona(name, CLOSING, &config))
        .collect();
    let groupchat = GroupChat::new(agents).with_max_round(10);
    let mut manager = GroupChatManager::new(groupchat, &config);

    manager
        .initiate_chat_with("Joseph", "Hi! Can you present yourselves?", &cli::session_options())
        .await
}
