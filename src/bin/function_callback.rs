//! A coder answers a currency question by calling the calculator tool,
//! which the executor runs.

use std::sync::Arc;

use workbench::agent::ConversableAgent;
use workbench::cli;
use workbench::code_execution::CodeExecutionConfig;
use workbench::config::LlmConfig;
use workbench::error::Result;
use workbench::termination::EndsWithTerminate;
use workbench::tools::{currency_calculator_tool, Tool};

#[tokio::main]
async fn main() {
    cli::init_logging();
    cli::finish(run().await);
}

async fn run() -> Result<workbench::agent::ChatResult> {
    let config = LlmConfig::from_env("OPENAI_KEY")?;
    let calculator: Arc<dyn Tool> = Arc::new(currency_calculator_tool());

    let mut coder = ConversableAgent::assistant("Coder", &config).register_for_llm(calculator.clone());
    let mut executor = ConversableAgent::user_proxy("Executor")
        .with_termination(EndsWithTerminate)
        .with_code_execution(Some(CodeExecutionConfig::default().with_work_dir("coding")))
        .register_for_execution(calculator);

    executor
        .initiate_chat_with(&mut coder, "How much is 5 USD in EUR?", &cli::session_options())
        .await
}
