//! A coder writes code to fetch and show a cat picture; the executor runs it.

use workbench::agent::ConversableAgent;
use workbench::cli;
use workbench::code_execution::CodeExecutionConfig;
use workbench::config::LlmConfig;
use workbench::error::Result;
use workbench::termination::EndsWithTerminate;

#[tokio::main]
async fn main() {
    cli::init_logging();
    cli::finish(run().await);
}

async fn run() -> Result<workbench::agent::ChatResult> {
    let config = LlmConfig::from_env("OPENAI_KEY")?;

    let mut coder = ConversableAgent::assistant("Coder", &config);
    let mut executor = ConversableAgent::user_proxy("Executor")
        .with_termination(EndsWithTerminate)
        .with_code_execution(Some(CodeExecutionConfig::default().with_work_dir("coding")));

    executor
        .initiate_chat_with(&mut coder, "Show me a picture of a cat.", &cli::session_options())
        .await
}
