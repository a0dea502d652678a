//! Knowledge base lookup backed by the retriever

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use super::{arg_str, Tool};
use crate::retrieval::Retriever;

/// Returned when the retriever has nothing for the query
pub const NOT_FOUND: &str = "No relevant information found in the knowledge base.";

/// Retrieve chunks for `query` and join them with blank lines.
pub async fn search_knowledge(retriever: &dyn Retriever, query: &str) -> String {
    match retriever.retrieve(query).await {
        Ok(chunks) if chunks.is_empty() => NOT_FOUND.to_string(),
        Ok(chunks) => chunks.join("\n\n"),
        Err(e) => format!("Error searching the knowledge base: {}", e),
    }
}

/// `knowledge_search` tool
pub struct KnowledgeTool {
    retriever: Arc<dyn Retriever>,
}

impl KnowledgeTool {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

impl Tool for KnowledgeTool {
    fn name(&self) -> &str {
        "knowledge_search"
    }

    fn description(&self) -> &str {
        "Searches the internal knowledge base of documents"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The question or topic to look up"
                }
            },
            "required": ["query"]
        })
    }

    fn call<'a>(&'a self, args: &'a Value) -> BoxFuture<'a, String> {
        Box::pin(async move {
            match arg_str(args, "query") {
                Ok(query) => search_knowledge(self.retriever.as_ref(), query).await,
                Err(e) => format!("Knowledge search error: {}", e),
            }
        })
    }
}
