//! Session: configuration, startup sequence and the interactive console

pub mod config;
pub mod controller;
pub mod repl;

pub use config::{resolve_model, SessionConfig, AVAILABLE_MODELS, DEFAULT_MODEL};
pub use controller::{Session, SessionState, SessionStatus, EXAMPLE_QUERIES};
pub use repl::{parse_command, run_repl, Command};

use crate::agent::AgentError;
use crate::bootstrap::BootstrapError;
use crate::ollama::RegistryError;

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error("model '{model}' is not available: {source}")]
    ModelUnavailable {
        model: String,
        #[source]
        source: RegistryError,
    },
    #[error("failed to create agents: {0}")]
    Agents(#[from] AgentError),
    #[error("the multiagent system is not running")]
    NotRunning,
}
