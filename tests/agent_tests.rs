//! Integration tests for the agent system
//!
//! These tests drive the reasoning loop and the agent tree with a scripted
//! backend. Tests that need a running Ollama server are marked #[ignore].

mod common;

use std::sync::Arc;

use serde_json::json;

use common::{api_error, text, tool_call, ScriptedBackend};
use multiagent::agent::{self, Agent, AgentConfig, AgentError, TopologyConfig, UNKNOWN_TOOL_LABEL};
use multiagent::metrics;
use multiagent::retrieval::{Retriever, StubRetriever};
use multiagent::tools::{CalculatorTool, Tool, ToolSet};

fn calculator_agent(backend: Arc<ScriptedBackend>, max_iterations: usize) -> Agent {
    Agent::new(
        backend,
        ToolSet::from_tools([Arc::new(CalculatorTool) as Arc<dyn Tool>]).unwrap(),
        AgentConfig {
            name: "analyst".to_string(),
            max_iterations,
            ..Default::default()
        },
    )
}

fn topology_config() -> TopologyConfig {
    TopologyConfig {
        model: "phi3".to_string(),
        temperature: 0.2,
        max_iterations: 5,
        verbose: false,
    }
}

#[test]
fn test_agent_config_defaults() {
    let config = AgentConfig::default();

    assert_eq!(config.model, "phi3");
    assert_eq!(config.max_iterations, 10);
    assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    assert!(!config.verbose);
}

#[test]
fn test_topology_shape() {
    let backend = Arc::new(ScriptedBackend::default());
    let retriever: Arc<dyn Retriever> = Arc::new(StubRetriever);
    let topology = agent::build(backend, retriever, &topology_config()).unwrap();

    assert_eq!(topology.model(), "phi3");
    assert_eq!(topology.coordinator.tools().names(), vec!["investigator", "analyst"]);
    assert_eq!(
        topology.investigator.tools().names(),
        vec!["knowledge_search", "web_search"]
    );
    assert_eq!(topology.analyst.tools().names(), vec!["calculator"]);
    for agent in [&topology.coordinator, &topology.investigator, &topology.analyst] {
        assert_eq!(agent.config().model, "phi3");
        assert_eq!(agent.config().max_iterations, 5);
    }
}

#[tokio::test]
async fn test_plain_answer_without_tools() {
    let backend = Arc::new(ScriptedBackend::new(vec![text("  Hello there.  ")]));
    let agent = calculator_agent(backend.clone(), 3);

    let reply = agent.chat("Hi").await.unwrap();

    assert_eq!(reply.response, "Hello there.");
    assert_eq!(reply.iterations, 1);
    assert_eq!(reply.tool_calls_made, 0);
    assert!(!reply.trace_id.is_empty());

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages[0].role, "system");
    assert_eq!(requests[0].messages[1].content, "Hi");
    let tools = requests[0].tools.as_ref().unwrap();
    assert_eq!(tools[0].function.name, "calculator");
}

#[tokio::test]
async fn test_coordinator_delegates_to_analyst() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        // coordinator asks the analyst
        tool_call("analyst", json!({"query": "What is 6 times 7?"})),
        // analyst uses the calculator, then answers
        tool_call("calculator", json!({"operation": "multiply", "a": 6, "b": 7})),
        text("6 times 7 is 42."),
        // coordinator wraps up
        text("The answer is 42."),
    ]));
    let retriever: Arc<dyn Retriever> = Arc::new(StubRetriever);
    let topology = agent::build(backend.clone(), retriever, &topology_config()).unwrap();
    let before = metrics::tool_calls("calculator");

    let reply = topology.coordinator.chat("How much is 6 * 7?").await.unwrap();

    assert_eq!(reply.response, "The answer is 42.");
    assert_eq!(reply.iterations, 2);
    assert_eq!(reply.tool_calls_made, 1);
    assert_eq!(backend.remaining(), 0);
    assert!(metrics::tool_calls("calculator") > before);

    let requests = backend.requests();
    assert_eq!(requests.len(), 4);
    // the analyst starts a fresh conversation with the delegated query
    assert_eq!(requests[1].messages.len(), 2);
    assert_eq!(requests[1].messages[1].content, "What is 6 times 7?");
    // the calculator result comes back as a tool message
    let observation = requests[2].messages.last().unwrap();
    assert_eq!(observation.role, "tool");
    assert_eq!(observation.content, "6 * 7 = 42");
    // and the analyst's answer is the coordinator's observation
    let observation = requests[3].messages.last().unwrap();
    assert_eq!(observation.content, "6 times 7 is 42.");
}

#[tokio::test]
async fn test_max_iterations_reached() {
    let call = || tool_call("calculator", json!({"operation": "sum", "a": 1, "b": 1}));
    let backend = Arc::new(ScriptedBackend::new(vec![call(), call(), call(), call()]));
    let agent = calculator_agent(backend.clone(), 3);

    let err = agent.chat("Loop forever").await.unwrap_err();

    assert!(matches!(
        err,
        AgentError::MaxIterationsReached { ref agent, limit: 3 } if agent == "analyst"
    ));
    assert_eq!(backend.requests().len(), 3);
}

#[tokio::test]
async fn test_prompted_tools_fallback() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        api_error(400, "registry.ollama.ai/library/phi:latest does not support tools"),
        text(r#"{"name": "calculator", "arguments": {"operation": "sum", "a": 2, "b": 3}}"#),
        text("2 plus 3 is 5."),
    ]));
    let agent = calculator_agent(backend.clone(), 5);

    let reply = agent.chat("Add 2 and 3").await.unwrap();

    assert_eq!(reply.response, "2 plus 3 is 5.");
    assert_eq!(reply.tool_calls_made, 1);
    assert!(agent.uses_prompted_tools());

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].tools.is_some());
    assert!(requests[1].tools.is_none());
    assert!(requests[1].messages[0].content.contains("calculator"));
    let observation = requests[2].messages.last().unwrap();
    assert_eq!(observation.role, "user");
    assert!(observation.content.contains("2 + 3 = 5"));
}

#[tokio::test]
async fn test_json_for_unknown_tool_is_plain_text() {
    let content = r#"Example format: {"name": "shell", "arguments": {"cmd": "ls"}}"#;
    let backend = Arc::new(ScriptedBackend::new(vec![text(content)]));
    let agent = calculator_agent(backend, 3);

    let reply = agent.chat("Show me the format").await.unwrap();

    assert_eq!(reply.response, content);
    assert_eq!(reply.tool_calls_made, 0);
}

#[tokio::test]
async fn test_unknown_native_tool_is_reported_to_model() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        tool_call("spreadsheet", json!({})),
        text("I cannot use that tool."),
    ]));
    let agent = calculator_agent(backend.clone(), 3);
    let unknown_before = metrics::tool_calls(UNKNOWN_TOOL_LABEL);

    let reply = agent.chat("Open a spreadsheet").await.unwrap();

    // invented names are counted under one fixed label
    assert!(metrics::tool_calls(UNKNOWN_TOOL_LABEL) > unknown_before);
    assert_eq!(metrics::tool_calls("spreadsheet"), 0);

    assert_eq!(reply.response, "I cannot use that tool.");
    let observation = backend.requests()[1].messages.last().cloned().unwrap();
    assert!(observation.content.starts_with("Error: unknown tool 'spreadsheet'"));
    assert!(observation.content.contains("calculator"));
}

#[tokio::test]
async fn test_backend_error_propagates() {
    let backend = Arc::new(ScriptedBackend::new(vec![api_error(500, "model crashed")]));
    let agent = calculator_agent(backend, 3);

    let err = agent.chat("Anything").await.unwrap_err();

    assert!(matches!(err, AgentError::Ollama(_)));
    assert!(err.to_string().contains("model crashed"));
}

#[tokio::test]
async fn test_failed_specialist_becomes_observation() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        tool_call("investigator", json!({"query": "What is Rust?"})),
        api_error(500, "out of memory"),
        text("The investigator is unavailable right now."),
    ]));
    let retriever: Arc<dyn Retriever> = Arc::new(StubRetriever);
    let topology = agent::build(backend.clone(), retriever, &topology_config()).unwrap();

    let reply = topology.coordinator.chat("What is Rust?").await.unwrap();

    assert_eq!(reply.response, "The investigator is unavailable right now.");
    let observation = backend.requests()[2].messages.last().cloned().unwrap();
    assert!(observation
        .content
        .starts_with("Error: the investigator agent could not answer"));
}

/// Requires a running Ollama server with phi3 pulled
#[tokio::test]
#[ignore]
async fn test_live_coordinator_answer() {
    use multiagent::ollama::{ChatClient, DEFAULT_BASE_URL};
    use std::time::Duration;

    let backend = Arc::new(ChatClient::new(DEFAULT_BASE_URL, Duration::from_secs(300)).unwrap());
    let retriever: Arc<dyn Retriever> = Arc::new(StubRetriever);
    let topology = agent::build(backend, retriever, &topology_config()).unwrap();

    let reply = topology
        .coordinator
        .chat("I need to calculate 23.5 * 17.8")
        .await
        .unwrap();

    println!("{}", reply.response);
    assert!(!reply.response.is_empty());
}
