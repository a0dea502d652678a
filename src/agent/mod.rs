//! Agent module for the coordinator/specialist hierarchy
//!
//! # Architecture
//!
//! ```text
//! User query → coordinator (Ollama /api/chat with tools)
//!                  ↓
//!           Tool call: investigator | analyst
//!                  ↓
//!           AgentTool → nested Agent::chat on the specialist
//!                  ↓
//!           Tool call: knowledge_search | web_search | calculator
//!                  ↓
//!           Text result → specialist answer → coordinator → final answer
//! ```
//!
//! Every call is awaited in place: the coordinator waits for the whole
//! specialist turn, and the specialist waits for each tool.

pub mod controller;
pub mod prompts;
pub mod tool;
pub mod topology;

pub use controller::{Agent, AgentConfig, AgentError, AgentReply, UNKNOWN_TOOL_LABEL};
pub use tool::AgentTool;
pub use topology::{build, Topology, TopologyConfig};
