//! Two people introduce themselves to each other.

use workbench::cli;
use workbench::config::LlmConfig;
use workbench::error::Result;

const CLOSING: &str = "both of you have presented yourselves";

#[tokio::main]
async fn main() {
    cli::init_logging();
    cli::finish(run().await);
}

async fn run() -> Result<workbench::agent::ChatResult> {
    let config = LlmConfig::from_env("API_KEY")?.with_temperature(0.0).with_cache_seed(0);

    let mut joseph = cli::persona("Joseph", CLOSING, &config);
    let mut maria = cli::persona("Maria", CLOSING, &config);

    joseph
        .initiate_chat_with(&mut maria, "Hi! What's your name?", &cli::session_options())
        .await
}
