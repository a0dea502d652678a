//! Ollama integration module
//!
//! This module provides clients for Ollama's HTTP API (chat with tool
//! calling, embeddings) and a thin wrapper over the `ollama` CLI used for
//! listing and pulling models.

pub mod chat;
pub mod cli;
pub mod embed;

/// Default address of a locally running Ollama server
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

// Re-export public types so other modules can `use crate::ollama::ChatClient`
pub use chat::{
    parse_tool_calls_from_text, ChatBackend, ChatClient, ChatError, ChatMessage, ChatRequest,
    ChatResponse, FunctionCall, FunctionDefinition, ToolCall, ToolDefinition,
};
pub use cli::{is_model_present, parse_model_list, ModelStatus, RegistryError, RuntimeCli};
pub use embed::{EmbedClient, EmbedError, Embedder};
