//! Exposes an agent as a tool another agent can call

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use super::Agent;
use crate::tools::{arg_str, Tool};

/// Wraps a specialist so the coordinator can delegate a question to it.
///
/// A call runs a complete nested turn on the specialist and returns its
/// final text.
pub struct AgentTool {
    name: String,
    description: String,
    agent: Arc<Agent>,
}

impl AgentTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, agent: Arc<Agent>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            agent,
        }
    }
}

impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The question or task for this agent"
                }
            },
            "required": ["query"]
        })
    }

    fn call<'a>(&'a self, args: &'a Value) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let query = match arg_str(args, "query") {
                Ok(query) => query,
                Err(e) => return format!("Error: {}", e),
            };
            match self.agent.chat(query).await {
                Ok(reply) => reply.response,
                Err(e) => format!("Error: the {} agent could not answer: {}", self.name, e),
            }
        })
    }
}
