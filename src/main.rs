//! multiagent - console entry point
//!
//! Usage:
//!   multiagent [MODEL] [--examples] [--data-dir DIR] [--temperature T] ...

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, warn};

use multiagent::ollama::DEFAULT_BASE_URL;
use multiagent::session::{self, resolve_model, Session, SessionConfig, AVAILABLE_MODELS};
use multiagent::tracing::{init_tracing, shutdown_tracing};

#[derive(Parser, Debug)]
#[command(name = "multiagent", version, about = "Multiagent assistant on local Ollama models")]
struct Cli {
    /// Model to use (phi, llama3, mistral, gemma); anything else falls back to phi3
    model: Option<String>,

    /// Run the example queries before the console
    #[arg(long, alias = "ejemplos")]
    examples: bool,

    /// Folder of text documents for the knowledge base
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Sampling temperature (0.0 to 2.0)
    #[arg(long, default_value_t = 0.7)]
    temperature: f32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120.0)]
    timeout: f64,

    /// Base URL of the Ollama HTTP API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    ollama_url: String,

    /// Embedding model for the knowledge base (defaults to the chat model)
    #[arg(long)]
    embed_model: Option<String>,

    /// Reasoning-loop limit for each agent
    #[arg(long, default_value_t = 10)]
    max_iterations: usize,

    /// Hide progress, tool calls and timings
    #[arg(short, long)]
    quiet: bool,

    /// Do not check or install the Ollama runtime
    #[arg(long)]
    skip_bootstrap: bool,

    /// Export spans to this OTLP collector
    #[arg(long)]
    otlp_endpoint: Option<String>,
}

impl Cli {
    fn session_config(&self, model_name: String) -> Result<SessionConfig, String> {
        let invalid = || format!("timeout must be a positive number of seconds, got {}", self.timeout);
        if self.timeout <= 0.0 {
            return Err(invalid());
        }
        // rejects NaN, infinity and values too large for a Duration
        let timeout = Duration::try_from_secs_f64(self.timeout).map_err(|_| invalid())?;
        Ok(SessionConfig {
            model_name,
            data_dir: self.data_dir.clone(),
            temperature: self.temperature,
            timeout,
            verbose: !self.quiet,
            ollama_url: self.ollama_url.clone(),
            embed_model: self.embed_model.clone(),
            max_iterations: self.max_iterations,
            bootstrap: !self.skip_bootstrap,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing("multiagent", !cli.quiet, cli.otlp_endpoint.as_deref()) {
        eprintln!("⚠️  Could not initialize tracing: {}", e);
    }

    let code = run(cli).await;
    shutdown_tracing();
    code
}

async fn run(cli: Cli) -> ExitCode {
    println!("{}", "=".repeat(80));
    println!("🤖 Multiagent system with Ollama");
    println!("{}", "=".repeat(80));

    let (model_name, substituted) = resolve_model(cli.model.as_deref());
    if substituted {
        if let Some(requested) = &cli.model {
            warn!(requested = %requested, "Unknown model requested");
            println!(
                "⚠️  Model '{}' is not one of {:?}; using '{}'",
                requested, AVAILABLE_MODELS, model_name
            );
        }
    }

    let config = match cli.session_config(model_name) {
        Ok(config) => config,
        Err(e) => {
            println!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut session = match Session::new(config) {
        Ok(session) => session,
        Err(e) => {
            println!("❌ Could not create the session: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = session.initialize().await {
        error!(error = %e, "Initialization failed");
        println!("❌ Could not initialize the system: {}", e);
        println!("Make sure Ollama is installed and running, then try again.");
        return ExitCode::FAILURE;
    }

    if cli.examples {
        session.run_examples().await;
    }

    match session::run_repl(&mut session).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Console failed");
            println!("❌ Unexpected error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["multiagent"]);
        assert!(cli.model.is_none());
        assert!(!cli.examples);
        let config = cli.session_config("phi3".into()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(config.verbose);
        assert!(config.bootstrap);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["multiagent", "llama3", "--ejemplos", "-q", "--timeout", "30"]);
        assert_eq!(cli.model.as_deref(), Some("llama3"));
        assert!(cli.examples);
        let config = cli.session_config("llama3".into()).unwrap();
        assert!(!config.verbose);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_rejects_non_positive_timeout() {
        let cli = Cli::parse_from(["multiagent", "--timeout", "0"]);
        assert!(cli.session_config("phi3".into()).is_err());
    }

    #[test]
    fn test_rejects_timeout_too_large_for_duration() {
        let cli = Cli::parse_from(["multiagent", "--timeout", "1e20"]);
        let err = cli.session_config("phi3".into()).unwrap_err();
        assert!(err.starts_with("timeout must be a positive number of seconds"));

        let cli = Cli::parse_from(["multiagent", "--timeout", "inf"]);
        assert!(cli.session_config("phi3".into()).is_err());
    }
}
