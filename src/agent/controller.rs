//! Agent reasoning loop
//!
//! Each call to [`Agent::chat`] starts a fresh conversation, asks the model
//! for a reply, runs any tool calls it makes, feeds the results back, and
//! repeats until the model answers in plain text.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::prompts::tool_catalogue;
use crate::metrics::{AGENT_ITERATIONS, AGENT_RUNS, LLM_CALL_DURATION, TOOL_CALLS};
use crate::ollama::{
    parse_tool_calls_from_text, ChatBackend, ChatError, ChatMessage, ChatRequest, ChatResponse,
    ToolCall,
};
use crate::tools::{DuplicateTool, ToolSet};

/// `TOOL_CALLS` label for calls to tools the agent does not have
pub const UNKNOWN_TOOL_LABEL: &str = "unknown";

/// Configuration for one agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Name used in logs and metrics (e.g., "coordinator")
    pub name: String,
    /// Model to use for Ollama (e.g., "phi3")
    pub model: String,
    /// Persona and instructions
    pub system_prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of iterations (LLM calls) before stopping
    pub max_iterations: usize,
    /// Print each tool call as it happens
    pub verbose: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "agent".to_string(),
            model: "phi3".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            temperature: 0.7,
            max_iterations: 10,
            verbose: false,
        }
    }
}

/// Result of an agent turn
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Final response from the LLM
    pub response: String,
    /// Number of iterations (LLM calls) made
    pub iterations: usize,
    /// Number of tool calls executed
    pub tool_calls_made: usize,
    /// Unique trace ID for this turn
    pub trace_id: String,
}

/// Error type for agent operations
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Maximum iterations reached without a final answer
    #[error("agent '{agent}' reached the maximum of {limit} iterations without an answer")]
    MaxIterationsReached { agent: String, limit: usize },
    /// Ollama chat error
    #[error("Ollama error: {0}")]
    Ollama(#[from] ChatError),
    #[error(transparent)]
    Tools(#[from] DuplicateTool),
}

/// A model bound to a persona and a tool set
pub struct Agent {
    backend: Arc<dyn ChatBackend>,
    tools: ToolSet,
    config: AgentConfig,
    /// Set once the model has refused native tool definitions
    prompted_tools: AtomicBool,
}

impl Agent {
    pub fn new(backend: Arc<dyn ChatBackend>, tools: ToolSet, config: AgentConfig) -> Self {
        Self {
            backend,
            tools,
            config,
            prompted_tools: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Whether tools are described in the prompt instead of sent natively.
    pub fn uses_prompted_tools(&self) -> bool {
        self.prompted_tools.load(Ordering::Relaxed)
    }

    /// Run one full turn for `query`.
    pub async fn chat(&self, query: &str) -> Result<AgentReply, AgentError> {
        let trace_id = Uuid::now_v7().to_string();

        let span = info_span!(
            "agent_turn",
            agent = %self.config.name,
            trace_id = %trace_id,
            model = %self.config.model,
            otel.name = "agent_turn"
        );

        self.run(query, trace_id).instrument(span).await
    }

    async fn run(&self, query: &str, trace_id: String) -> Result<AgentReply, AgentError> {
        let name = self.config.name.as_str();
        info!(agent = name, query = %query, "Starting agent turn");

        let mut messages = vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(query),
        ];

        let mut iterations = 0;
        let mut tool_calls_made = 0;

        loop {
            iterations += 1;

            if iterations > self.config.max_iterations {
                warn!(agent = name, iterations, "Max iterations reached");
                AGENT_RUNS.with_label_values(&[name, "max_iterations"]).inc();
                AGENT_ITERATIONS.with_label_values(&[name]).observe(iterations as f64);
                return Err(AgentError::MaxIterationsReached {
                    agent: name.to_string(),
                    limit: self.config.max_iterations,
                });
            }

            let response = match self.complete(&mut messages, iterations).await {
                Ok(response) => response,
                Err(e) => {
                    AGENT_RUNS.with_label_values(&[name, "error"]).inc();
                    return Err(e.into());
                }
            };

            messages.push(response.message.clone());

            let tool_calls = self.extract_tool_calls(&response);

            if tool_calls.is_empty() {
                info!(agent = name, iterations, tool_calls = tool_calls_made, "Agent turn completed");
                AGENT_RUNS.with_label_values(&[name, "success"]).inc();
                AGENT_ITERATIONS.with_label_values(&[name]).observe(iterations as f64);

                return Ok(AgentReply {
                    response: response.message.content.trim().to_string(),
                    iterations,
                    tool_calls_made,
                    trace_id,
                });
            }

            for tool_call in tool_calls {
                tool_calls_made += 1;
                let tool = tool_call.function.name.as_str();
                let args = &tool_call.function.arguments;
                // model-supplied names are not trusted as label values
                let label = if self.tools.get(tool).is_some() { tool } else { UNKNOWN_TOOL_LABEL };
                TOOL_CALLS.with_label_values(&[label]).inc();

                if self.config.verbose {
                    println!("[{}] → {} {}", name, tool, args);
                }
                info!(agent = name, tool, "Calling tool");

                let output = self
                    .tools
                    .call(tool, args)
                    .instrument(info_span!("tool_call", tool = %tool, otel.name = "tool_call"))
                    .await;

                if self.config.verbose {
                    println!("[{}] ← {}", name, indent(&output));
                }
                debug!(agent = name, tool, output_len = output.len(), "Tool returned");

                messages.push(self.observation(tool, output));
            }
        }
    }

    /// One model call, switching to prompted tools if the model rejects native ones.
    async fn complete(
        &self,
        messages: &mut [ChatMessage],
        iteration: usize,
    ) -> Result<ChatResponse, ChatError> {
        let model = self.config.model.as_str();
        let llm_span = info_span!(
            "llm_call",
            agent = %self.config.name,
            iteration,
            model = %model,
            otel.name = "llm_call"
        );

        let call_start = Instant::now();
        let result = match self
            .backend
            .chat(self.request(messages))
            .instrument(llm_span.clone())
            .await
        {
            Err(e) if e.is_tools_unsupported() && !self.uses_prompted_tools() => {
                warn!(agent = %self.config.name, model, "Model has no native tool support, describing tools in the prompt");
                self.prompted_tools.store(true, Ordering::Relaxed);
                messages[0] = ChatMessage::system(self.system_prompt());
                self.backend
                    .chat(self.request(messages))
                    .instrument(llm_span)
                    .await
            }
            other => other,
        };

        let elapsed = call_start.elapsed().as_secs_f64();
        LLM_CALL_DURATION.with_label_values(&[model]).observe(elapsed);
        debug!(agent = %self.config.name, iteration, duration_ms = elapsed * 1000.0, "LLM call finished");
        result
    }

    fn request(&self, messages: &[ChatMessage]) -> ChatRequest {
        let tools = if self.tools.is_empty() || self.uses_prompted_tools() {
            None
        } else {
            Some(self.tools.definitions())
        };
        ChatRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            tools,
            temperature: self.config.temperature,
        }
    }

    fn system_prompt(&self) -> String {
        if self.uses_prompted_tools() && !self.tools.is_empty() {
            format!("{}\n\n{}", self.config.system_prompt, tool_catalogue(&self.tools))
        } else {
            self.config.system_prompt.clone()
        }
    }

    /// Native tool calls first; otherwise JSON calls written in the content,
    /// kept only when they name one of this agent's tools.
    fn extract_tool_calls(&self, response: &ChatResponse) -> Vec<ToolCall> {
        if let Some(calls) = response.message.tool_calls.as_ref().filter(|c| !c.is_empty()) {
            return calls.clone();
        }
        parse_tool_calls_from_text(&response.message.content)
            .into_iter()
            .filter(|call| self.tools.get(&call.function.name).is_some())
            .collect()
    }

    fn observation(&self, tool: &str, output: String) -> ChatMessage {
        if self.uses_prompted_tools() {
            ChatMessage::user(format!("Result of tool '{}':\n{}", tool, output))
        } else {
            ChatMessage::tool(output)
        }
    }
}

fn indent(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join("\n    ")
}
