//! Offline stand-in for a web search
//!
//! Looks the query up against a fixed table of keyword facts so the
//! investigator has a second source without any network access.

use futures_util::future::BoxFuture;
use serde_json::Value;

use super::{arg_str, Tool};

/// Keyword → fact table, matched in this order.
const FACTS: &[(&str, &str)] = &[
    ("python", "Python is a versatile programming language used in data science, web development and automation."),
    ("javascript", "JavaScript is a programming language for web development that makes pages interactive."),
    ("llama index", "LlamaIndex is a library for building LLM applications over custom data sources."),
    ("agent", "AI agents are autonomous systems that perceive, decide and act to reach goals."),
    ("rag", "RAG (Retrieval Augmented Generation) combines data retrieval with text generation."),
    ("ollama", "Ollama is a tool for running language models locally without cloud services."),
    ("phi", "Phi is a small language model developed by Microsoft, designed to run on personal computers with limited resources."),
    ("llama", "LLaMA (Large Language Model Meta AI) is a family of language models developed by Meta AI."),
    ("mistral", "Mistral is a family of language models developed by Mistral AI, with versions tuned for different sizes and use cases."),
    ("gemma", "Gemma is a language model developed by Google, optimized to run on computers with limited resources."),
    ("cpu", "The CPU (Central Processing Unit) is the 'brain' of the computer that executes instructions."),
    ("gpu", "The GPU (Graphics Processing Unit) is optimized for parallel operations and is ideal for AI."),
    ("multiagent", "A multiagent system is a network of AI agents that collaborate to solve complex problems."),
];

/// Every fact whose keyword appears in `query` (case-insensitive), one per line.
pub fn search_web_stub(query: &str) -> String {
    let needle = query.to_lowercase();
    let hits: Vec<&str> = FACTS
        .iter()
        .filter(|(keyword, _)| needle.contains(keyword))
        .map(|(_, fact)| *fact)
        .collect();

    if hits.is_empty() {
        return format!("No information found about: {}", query);
    }
    hits.join("\n")
}

/// `web_search` tool
pub struct WebSearchTool;

impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Searches the web for general information (simulated)"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for"
                }
            },
            "required": ["query"]
        })
    }

    fn call<'a>(&'a self, args: &'a Value) -> BoxFuture<'a, String> {
        Box::pin(async move {
            match arg_str(args, "query") {
                Ok(query) => search_web_stub(query),
                Err(e) => format!("Web search error: {}", e),
            }
        })
    }
}
