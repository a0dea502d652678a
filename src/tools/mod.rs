//! Tools the agents can call
//!
//! Every tool takes JSON arguments from the model and returns a plain
//! string. Failures are returned as text too, so the calling agent can
//! reason about them instead of aborting its turn.

pub mod calculator;
pub mod knowledge;
pub mod web;

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::ollama::{FunctionDefinition, ToolDefinition};

pub use calculator::{calculate, CalculatorTool, Operation};
pub use knowledge::{search_knowledge, KnowledgeTool};
pub use web::{search_web_stub, WebSearchTool};

/// A named, described function an agent may invoke mid-conversation.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Natural-language description the model uses to pick the tool.
    fn description(&self) -> &str;

    /// JSON Schema of the arguments object.
    fn parameters(&self) -> Value;

    /// Run the tool. Never fails: errors come back as descriptive text.
    fn call<'a>(&'a self, args: &'a Value) -> BoxFuture<'a, String>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: self.parameters(),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("a tool named '{0}' is already registered")]
pub struct DuplicateTool(pub String);

/// Ordered set of tools bound to one agent. Names are unique.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a list, rejecting duplicate names.
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Result<Self, DuplicateTool> {
        let mut set = Self::new();
        for tool in tools {
            set.add(tool)?;
        }
        Ok(set)
    }

    pub fn add(&mut self, tool: Arc<dyn Tool>) -> Result<(), DuplicateTool> {
        if self.get(tool.name()).is_some() {
            return Err(DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a call by name. Unknown names get a message listing the valid ones.
    pub async fn call(&self, name: &str, args: &Value) -> String {
        match self.get(name) {
            Some(tool) => tool.call(args).await,
            None => format!(
                "Error: unknown tool '{}'. Available tools: {}",
                name,
                self.names().join(", ")
            ),
        }
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Read a string argument.
pub(crate) fn arg_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(format!("argument '{}' must be a string, got {}", key, other)),
        None => Err(format!("missing argument '{}'", key)),
    }
}

/// Read a numeric argument. Models often quote numbers, so numeric strings are accepted.
pub(crate) fn arg_f64(args: &Value, key: &str) -> Result<f64, String> {
    match args.get(key) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("argument '{}' is not a finite number", key)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("argument '{}' is not a number: '{}'", key, s)),
        Some(other) => Err(format!("argument '{}' must be a number, got {}", key, other)),
        None => Err(format!("missing argument '{}'", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_toolset_dispatch_and_unknown() {
        let set = ToolSet::from_tools([
            Arc::new(CalculatorTool) as Arc<dyn Tool>,
            Arc::new(WebSearchTool) as Arc<dyn Tool>,
        ])
        .unwrap();

        assert_eq!(set.names(), vec!["calculator", "web_search"]);
        let out = set
            .call("calculator", &json!({"operation": "sum", "a": 2, "b": 3}))
            .await;
        assert_eq!(out, "2 + 3 = 5");

        let out = set.call("teleport", &json!({})).await;
        assert!(out.contains("unknown tool 'teleport'"));
        assert!(out.contains("calculator, web_search"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = ToolSet::from_tools([
            Arc::new(WebSearchTool) as Arc<dyn Tool>,
            Arc::new(WebSearchTool) as Arc<dyn Tool>,
        ])
        .unwrap_err();
        assert_eq!(err.0, "web_search");
    }

    #[test]
    fn test_definitions_are_functions() {
        let set = ToolSet::from_tools([Arc::new(CalculatorTool) as Arc<dyn Tool>]).unwrap();
        let defs = set.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].tool_type, "function");
        assert_eq!(defs[0].function.parameters["required"][0], "operation");
    }

    #[test]
    fn test_numeric_args_accept_strings() {
        let args = json!({"a": "2.5", "b": 4, "c": true});
        assert_eq!(arg_f64(&args, "a").unwrap(), 2.5);
        assert_eq!(arg_f64(&args, "b").unwrap(), 4.0);
        assert!(arg_f64(&args, "c").is_err());
        assert!(arg_f64(&args, "d").unwrap_err().contains("missing"));
    }
}
