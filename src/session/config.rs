//! Session configuration

use std::path::PathBuf;
use std::time::Duration;

use super::SessionError;
use crate::ollama::DEFAULT_BASE_URL;

/// Models that may be picked on the command line
pub const AVAILABLE_MODELS: [&str; 4] = ["phi", "llama3", "mistral", "gemma"];

/// Used when no model, or one outside [`AVAILABLE_MODELS`], is requested
pub const DEFAULT_MODEL: &str = "phi3";

/// Accepted temperature range
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Configuration for a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Ollama model used by every agent
    pub model_name: String,
    /// Folder of text documents for the knowledge base
    pub data_dir: PathBuf,
    /// Sampling temperature (higher = more creative)
    pub temperature: f32,
    /// Upper bound for a single model request
    pub timeout: Duration,
    /// Print progress, tool calls and timings
    pub verbose: bool,
    /// Base URL of the Ollama HTTP API
    pub ollama_url: String,
    /// Embedding model for the index; defaults to `model_name`
    pub embed_model: Option<String>,
    /// Reasoning-loop limit for each agent
    pub max_iterations: usize,
    /// Check and install the runtime before anything else
    pub bootstrap: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            data_dir: PathBuf::from("./data"),
            temperature: 0.7,
            timeout: Duration::from_secs(120),
            verbose: true,
            ollama_url: DEFAULT_BASE_URL.to_string(),
            embed_model: None,
            max_iterations: 10,
            bootstrap: true,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.model_name.trim().is_empty() {
            return Err(SessionError::Configuration("model name is empty".to_string()));
        }
        if !TEMPERATURE_RANGE.contains(&self.temperature) {
            return Err(SessionError::Configuration(format!(
                "temperature {} is outside {:?}",
                self.temperature, TEMPERATURE_RANGE
            )));
        }
        if self.timeout.is_zero() {
            return Err(SessionError::Configuration("timeout must be positive".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(SessionError::Configuration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The model used for embeddings.
    pub fn embed_model(&self) -> &str {
        self.embed_model.as_deref().unwrap_or(&self.model_name)
    }
}

/// Pick the model from the command line.
///
/// Returns the chosen name and whether the default was substituted.
pub fn resolve_model(requested: Option<&str>) -> (String, bool) {
    match requested {
        Some(name) if AVAILABLE_MODELS.contains(&name) => (name.to_string(), false),
        _ => (DEFAULT_MODEL.to_string(), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.embed_model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = SessionConfig {
            temperature: 3.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SessionError::Configuration(_))));

        let config = SessionConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_model() {
        assert_eq!(resolve_model(Some("llama3")), ("llama3".to_string(), false));
        assert_eq!(resolve_model(Some("gpt-4")), (DEFAULT_MODEL.to_string(), true));
        assert_eq!(resolve_model(None), (DEFAULT_MODEL.to_string(), true));
    }

    #[test]
    fn test_embed_model_override() {
        let config = SessionConfig {
            embed_model: Some("nomic-embed-text".to_string()),
            ..Default::default()
        };
        assert_eq!(config.embed_model(), "nomic-embed-text");
    }
}
