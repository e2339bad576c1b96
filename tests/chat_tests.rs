//! Two-party conversation tests using mock providers.

mod common;

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{FailingProvider, MockProvider};
use workbench::agent::{ChatEvent, ChatOptions, ConversableAgent, TerminationReason};
use workbench::error::WorkbenchError;
use workbench::termination::{ContainsTerminate, ContainsText, EndsWithTerminate};
use workbench::tools::{currency_calculator, currency_calculator_tool, AgentTool, AgentToolParameters, Tool};
use workbench::types::{GenerationSettings, Role};

fn persona(name: &str, provider: Arc<MockProvider>) -> ConversableAgent {
    ConversableAgent::new(name)
        .with_system_message(format!("You are a person called {name}."))
        .with_termination(ContainsTerminate)
        .with_provider(provider, GenerationSettings::default())
}

fn transcript(result: &workbench::agent::ChatResult) -> Vec<(String, String, String)> {
    result
        .messages
        .iter()
        .map(|m| (m.sender.clone(), m.recipient.clone(), m.content()))
        .collect()
}

#[tokio::test]
async fn introductions_stop_when_receiver_sees_terminate() {
    let joseph_llm = MockProvider::shared("mock");
    let maria_llm = MockProvider::shared("mock");
    maria_llm.queue_response("Hi, I'm Maria. And you?");
    joseph_llm.queue_response("I'm Joseph. Nice to meet you. TERMINATE");

    let mut joseph = persona("Joseph", joseph_llm.clone());
    let mut maria = persona("Maria", maria_llm.clone());

    let result = joseph.initiate_chat(&mut maria, "Hi! What's your name?").await.unwrap();

    assert_eq!(
        transcript(&result),
        vec![
            ("Joseph".into(), "Maria".into(), "Hi! What's your name?".into()),
            ("Maria".into(), "Joseph".into(), "Hi, I'm Maria. And you?".into()),
            ("Joseph".into(), "Maria".into(), "I'm Joseph. Nice to meet you. TERMINATE".into()),
        ]
    );
    assert_eq!(
        result.termination,
        TerminationReason::TerminationMessage { agent: "Maria".into() }
    );
    assert_eq!(result.usage.total_tokens, 60);

    // Maria stops before asking her model again.
    assert_eq!(maria_llm.call_count(), 1);
    assert_eq!(joseph_llm.call_count(), 1);
}

#[tokio::test]
async fn history_is_seen_from_each_agent() {
    let joseph_llm = MockProvider::shared("mock");
    let maria_llm = MockProvider::shared("mock");
    maria_llm.queue_response("I'm Maria.");
    joseph_llm.queue_response("TERMINATE");

    let mut joseph = persona("Joseph", joseph_llm.clone());
    let mut maria = persona("Maria", maria_llm.clone());
    joseph.initiate_chat(&mut maria, "Hi! What's your name?").await.unwrap();

    let maria_view = &maria_llm.requests()[0].messages;
    assert_eq!(maria_view.len(), 2);
    assert_eq!(maria_view[0].role, Role::System);
    assert_eq!(maria_view[0].text(), "You are a person called Maria.");
    assert_eq!(maria_view[1].role, Role::User);
    assert_eq!(maria_view[1].name.as_deref(), Some("Joseph"));

    let joseph_view = &joseph_llm.requests()[0].messages;
    let roles: Vec<Role> = joseph_view.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User]);
}

#[tokio::test]
async fn tool_round_trip_feeds_result_back_to_caller() {
    let coder_llm = MockProvider::shared("mock");
    coder_llm.queue_tool_call("call_1", "currency_calculator", json!({"base_amount": 5}));
    coder_llm.queue_response("5 USD is 4.545454545454545 EUR.\n\nTERMINATE");

    let calculator: Arc<dyn Tool> = Arc::new(currency_calculator_tool());
    let mut coder = ConversableAgent::new("Coder")
        .with_system_message("You are a helpful AI assistant.")
        .with_provider(coder_llm.clone(), GenerationSettings::default())
        .register_for_llm(calculator.clone());
    let mut executor = ConversableAgent::user_proxy("Executor")
        .with_termination(EndsWithTerminate)
        .with_code_execution(None)
        .register_for_execution(calculator);

    let result = executor.initiate_chat(&mut coder, "How much is 5 USD in EUR?").await.unwrap();

    assert_eq!(result.messages.len(), 4);
    assert_eq!(result.messages[1].tool_calls()[0].name, "currency_calculator");
    let tool_result = result.messages[2].tool_results()[0].clone();
    assert_eq!(tool_result.tool_call_id, "call_1");
    assert!(!tool_result.is_error);
    assert_eq!(tool_result.content_text(), "4.545454545454545 EUR");
    assert_eq!(
        result.termination,
        TerminationReason::TerminationMessage { agent: "Executor".into() }
    );

    let requests = coder_llm.requests();
    let advertised: Vec<String> = requests[0]
        .tools
        .as_ref()
        .unwrap()
        .iter()
        .map(|t| t.name.clone())
        .collect();
    assert_eq!(advertised, vec!["currency_calculator".to_string()]);

    let second = &requests[1].messages;
    assert_eq!(second[2].role, Role::Assistant);
    assert_eq!(second[3].role, Role::Tool);
    assert_eq!(second[3].tool_results()[0].content_text(), "4.545454545454545 EUR");
}

#[tokio::test]
async fn tool_errors_become_error_results() {
    let coder_llm = MockProvider::shared("mock");
    coder_llm.queue_tool_call(
        "call_1",
        "currency_calculator",
        json!({"base_amount": 5, "base_currency": "JPY"}),
    );
    coder_llm.queue_response("Sorry, I cannot convert JPY. TERMINATE");

    let calculator: Arc<dyn Tool> = Arc::new(currency_calculator_tool());
    let mut coder = ConversableAgent::new("Coder")
        .with_provider(coder_llm, GenerationSettings::default())
        .register_for_llm(calculator.clone());
    let mut executor = ConversableAgent::new("Executor")
        .with_termination(EndsWithTerminate)
        .register_for_execution(calculator);

    let result = executor.initiate_chat(&mut coder, "How much is 5 JPY in EUR?").await.unwrap();

    let tool_result = result.messages[2].tool_results()[0].clone();
    assert!(tool_result.is_error);
    assert_eq!(tool_result.content_text(), "Error: Invalid argument: Unknown currencies JPY, EUR");
    assert_eq!(result.messages.len(), 4);
}

#[tokio::test]
async fn unknown_tool_is_reported_to_caller() {
    let coder_llm = MockProvider::shared("mock");
    coder_llm.queue_tool_call("call_9", "weather", json!({}));
    coder_llm.queue_response("TERMINATE");

    let other: Arc<dyn Tool> = Arc::new(AgentTool::new(
        "echo",
        "Echo",
        AgentToolParameters::empty(),
        |args, _ctx| async move { Ok(args.raw().clone()) },
    ));
    let mut coder = ConversableAgent::new("Coder").with_provider(coder_llm, GenerationSettings::default());
    let mut executor = ConversableAgent::new("Executor").register_for_execution(other);

    let result = executor.initiate_chat(&mut coder, "What's the weather?").await.unwrap();

    let tool_result = result.messages[2].tool_results()[0].clone();
    assert!(tool_result.is_error);
    assert_eq!(tool_result.content_text(), "Error: Function weather not found.");
}

#[tokio::test]
async fn customer_thanks_dealer_after_batched_quotes() {
    let dealer_llm = MockProvider::shared("mock");
    dealer_llm.queue_tool_calls(&[
        ("call_a", "currency_calculator", json!({"base_amount": 100})),
        (
            "call_b",
            "currency_calculator",
            json!({"base_amount": 100, "base_currency": "EUR", "quote_currency": "USD"}),
        ),
    ]);
    dealer_llm.queue_response("Those are today's quotes.");
    let customer_llm = MockProvider::shared("mock");
    customer_llm.queue_response("Thank you");

    let calculator: Arc<dyn Tool> = Arc::new(currency_calculator_tool());
    let mut dealer = ConversableAgent::new("Dealer")
        .with_system_message("You are a currency exchange dealer.")
        .with_termination(ContainsText::new("Thank you"))
        .with_provider(dealer_llm.clone(), GenerationSettings::default())
        .register_for_llm(calculator.clone());
    let mut customer = ConversableAgent::new("Customer")
        .with_termination(ContainsText::new("Thank you"))
        .with_provider(customer_llm, GenerationSettings::default())
        .register_for_execution(calculator);

    let result = customer
        .initiate_chat(&mut dealer, "How much is 100 USD in EUR? And 100 EUR in USD?")
        .await
        .unwrap();

    assert_eq!(result.messages.len(), 5);
    let quotes: Vec<String> = result.messages[2]
        .tool_results()
        .iter()
        .map(|r| r.content_text())
        .collect();
    assert_eq!(
        quotes,
        vec![
            currency_calculator(100.0, "USD", "EUR").unwrap(),
            currency_calculator(100.0, "EUR", "USD").unwrap(),
        ]
    );
    assert_eq!(result.summary(), "Thank you");
    assert_eq!(
        result.termination,
        TerminationReason::TerminationMessage { agent: "Dealer".into() }
    );
    assert_eq!(dealer_llm.call_count(), 2);
}

#[tokio::test]
async fn agent_without_tools_rejects_tool_calls() {
    let dir = tempfile::tempdir().unwrap();
    let coder_llm = MockProvider::shared("mock");
    coder_llm.queue_tool_call("call_3", "draw_cat", json!({"style": "ascii"}));
    coder_llm.queue_response("I cannot draw directly.\nTERMINATE");

    let mut coder = ConversableAgent::new("Coder").with_provider(coder_llm.clone(), GenerationSettings::default());
    let mut executor = ConversableAgent::user_proxy("Executor")
        .with_termination(EndsWithTerminate)
        .with_code_execution(Some(
            workbench::code_execution::CodeExecutionConfig::default().with_work_dir(dir.path()),
        ));

    let result = executor.initiate_chat(&mut coder, "Show me a picture of a cat.").await.unwrap();

    assert_eq!(result.messages.len(), 4);
    let tool_result = result.messages[2].tool_results()[0].clone();
    assert_eq!(tool_result.tool_call_id, "call_3");
    assert!(tool_result.is_error);
    assert_eq!(tool_result.content_text(), "Error: Function draw_cat not found.");

    // The failure reaches the coder's next request.
    let second = &coder_llm.requests()[1].messages;
    assert_eq!(second.last().unwrap().role, Role::Tool);
}

#[tokio::test]
async fn consecutive_auto_reply_limit_ends_chat() {
    let mut first = ConversableAgent::new("First").with_max_consecutive_auto_reply(2);
    let mut second = ConversableAgent::new("Second").with_max_consecutive_auto_reply(2);

    let result = first.initiate_chat(&mut second, "hello").await.unwrap();

    // hello, then two empty default replies from each side.
    assert_eq!(result.messages.len(), 5);
    assert!(result.messages[1..].iter().all(|m| m.content().is_empty()));
    assert_eq!(
        result.termination,
        TerminationReason::MaxConsecutiveAutoReply { agent: "Second".into() }
    );
}

#[tokio::test]
async fn max_turns_limits_replies() {
    let mut first = ConversableAgent::new("First");
    let mut second = ConversableAgent::new("Second").with_default_auto_reply("ok");

    let options = ChatOptions::default().with_max_turns(1);
    let result = first.initiate_chat_with(&mut second, "hello", &options).await.unwrap();

    assert_eq!(result.messages.len(), 2);
    assert_eq!(result.summary(), "ok");
    assert_eq!(result.termination, TerminationReason::MaxTurns);
}

#[tokio::test]
async fn event_sink_sees_every_message_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = seen.clone();
    let options = ChatOptions::default().with_event_sink(Arc::new(move |event: ChatEvent| match event {
        ChatEvent::Message(m) => sink_seen.lock().unwrap().push(m.sender.clone()),
        ChatEvent::Finished(reason) => sink_seen.lock().unwrap().push(format!("done: {reason}")),
        ChatEvent::SpeakerSelected { .. } => {}
    }));

    let maria_llm = MockProvider::shared("mock");
    maria_llm.queue_response("TERMINATE");
    let mut joseph = persona("Joseph", MockProvider::shared("mock"));
    let mut maria = persona("Maria", maria_llm);

    joseph.initiate_chat_with(&mut maria, "Hi!", &options).await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "Joseph".to_string(),
            "Maria".to_string(),
            "done: Joseph received a termination message".to_string(),
        ]
    );
}

#[tokio::test]
async fn provider_errors_abort_the_chat() {
    let mut joseph = ConversableAgent::new("Joseph");
    let mut maria = ConversableAgent::new("Maria")
        .with_provider(Arc::new(FailingProvider { status: 500 }), GenerationSettings::default());

    let err = joseph.initiate_chat(&mut maria, "Hi!").await.unwrap_err();

    assert!(matches!(err, WorkbenchError::Api { status: 500, .. }));
    assert!(err.is_provider_error());
}

#[cfg(unix)]
#[tokio::test]
async fn user_proxy_executes_code_from_assistant() {
    let dir = tempfile::tempdir().unwrap();
    let coder_llm = MockProvider::shared("mock");
    coder_llm.queue_response("Run this:\n```sh\necho hello\n```");
    coder_llm.queue_response("The script printed hello.\nTERMINATE");

    let mut coder = ConversableAgent::new("Coder").with_provider(coder_llm, GenerationSettings::default());
    let mut executor = ConversableAgent::user_proxy("Executor")
        .with_termination(EndsWithTerminate)
        .with_code_execution(Some(
            workbench::code_execution::CodeExecutionConfig::default().with_work_dir(dir.path()),
        ));

    let result = executor.initiate_chat(&mut coder, "Say hello from the shell.").await.unwrap();

    assert_eq!(result.messages.len(), 4);
    assert_eq!(
        result.messages[2].content(),
        "exitcode: 0 (execution succeeded)\nCode output: hello\n"
    );
    assert_eq!(
        result.termination,
        TerminationReason::TerminationMessage { agent: "Executor".into() }
    );
}
