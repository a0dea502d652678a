//! Multiagent - a console assistant built from cooperating Ollama agents
//!
//! A coordinator agent answers user queries by delegating to two
//! specialists: an investigator (knowledge base and web search) and an
//! analyst (calculator). Every agent runs on a locally served Ollama model.
//!
//! # Modules
//!
//! - `bootstrap` - Detect and install the Ollama runtime
//! - `ollama` - Chat and embedding clients, `ollama` CLI wrapper
//! - `retrieval` - Document loading, chunking and the vector index
//! - `tools` - Calculator, web search stub and knowledge search tools
//! - `agent` - Reasoning loop, agents-as-tools and the agent topology
//! - `session` - Startup sequence, model switching and the console
//! - `metrics` - Prometheus metrics for agent runs and tool calls
//! - `tracing` - Logging and optional OpenTelemetry export
//!
//! # Quick Start
//!
//! ```ignore
//! use multiagent::session::{Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default())?;
//! session.initialize().await?;
//! println!("{}", session.respond("What is RAG?").await);
//! ```

pub mod agent;
pub mod bootstrap;
pub mod metrics;
pub mod ollama;
pub mod retrieval;
pub mod session;
pub mod tools;
pub mod tracing;

// Re-export commonly used types at crate root for convenience
pub use agent::{Agent, AgentConfig, AgentReply};
pub use session::{Session, SessionConfig, SessionError};
