//! Session controller: startup sequence, query routing and model switching
//!
//! Startup walks through [`SessionState`] in order:
//!
//! ```text
//! Created → ModelVerified → ModelConfigured → DocumentsReady → IndexReady → ToolsReady → Running
//! ```
//!
//! A failure before `DocumentsReady` aborts startup. Document seeding and
//! index building only degrade the session (stub retriever) when they fail.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::{SessionConfig, SessionError};
use crate::agent::{self, Topology, TopologyConfig};
use crate::bootstrap::Bootstrapper;
use crate::metrics;
use crate::ollama::{ChatBackend, ChatClient, EmbedClient, Embedder, RegistryError, RuntimeCli};
use crate::retrieval::{self, Retriever, StubRetriever, DEFAULT_TOP_K};

/// Queries run by the scripted demo
pub const EXAMPLE_QUERIES: [&str; 3] = [
    "What is Python and what is it used for?",
    "I need to calculate 23.5 * 17.8",
    "What is RAG, and can you compute 15 squared?",
];

/// Where the session is in its startup sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Created,
    ModelVerified,
    ModelConfigured,
    DocumentsReady,
    IndexReady,
    ToolsReady,
    Running,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Created => "created",
            SessionState::ModelVerified => "model verified",
            SessionState::ModelConfigured => "model configured",
            SessionState::DocumentsReady => "documents ready",
            SessionState::IndexReady => "index ready",
            SessionState::ToolsReady => "tools ready",
            SessionState::Running => "running",
        };
        f.write_str(name)
    }
}

/// Snapshot shown by the `status` command
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub model: String,
    pub embed_model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub data_dir: String,
    pub state: SessionState,
    pub retriever: &'static str,
    pub agents_active: bool,
    pub queries_answered: u64,
    /// Process-wide successful coordinator turns
    pub coordinator_runs: u64,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 System status:")?;
        writeln!(f, "- Current model: {}", self.model)?;
        writeln!(f, "- Embedding model: {}", self.embed_model)?;
        writeln!(f, "- Temperature: {}", self.temperature)?;
        writeln!(f, "- Timeout: {}s", self.timeout.as_secs_f64())?;
        writeln!(f, "- Data directory: {}", self.data_dir)?;
        writeln!(f, "- Knowledge base: {}", self.retriever)?;
        writeln!(f, "- State: {}", self.state)?;
        writeln!(f, "- Multiagent system active: {}", if self.agents_active { "yes" } else { "no" })?;
        writeln!(f, "- Queries answered: {}", self.queries_answered)?;
        write!(f, "- Successful coordinator runs: {}", self.coordinator_runs)
    }
}

/// One user session: configuration, clients and the live agent tree
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    cli: RuntimeCli,
    chat: Arc<dyn ChatBackend>,
    embedder: Arc<dyn Embedder>,
    retriever: Arc<dyn Retriever>,
    topology: Option<Topology>,
    queries_answered: u64,
}

impl Session {
    /// Create a session talking to the Ollama server in `config`.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let chat = ChatClient::new(&config.ollama_url, config.timeout)
            .map_err(|e| SessionError::Configuration(e.to_string()))?;
        let embedder = EmbedClient::new(&config.ollama_url, config.embed_model(), config.timeout)
            .map_err(|e| SessionError::Configuration(e.to_string()))?;
        Ok(Self::with_backends(
            config,
            RuntimeCli::default(),
            Arc::new(chat),
            Arc::new(embedder),
        ))
    }

    /// Create a session with explicit runtime CLI and model backends.
    pub fn with_backends(
        config: SessionConfig,
        cli: RuntimeCli,
        chat: Arc<dyn ChatBackend>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        println!("🚀 Starting multiagent system with model '{}'", config.model_name);
        Self {
            config,
            state: SessionState::Created,
            cli,
            chat,
            embedder,
            retriever: Arc::new(StubRetriever),
            topology: None,
            queries_answered: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running && self.topology.is_some()
    }

    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    pub fn retriever(&self) -> &Arc<dyn Retriever> {
        &self.retriever
    }

    /// Run the whole startup sequence.
    pub async fn initialize(&mut self) -> Result<(), SessionError> {
        self.config.validate()?;

        if self.config.bootstrap {
            Bootstrapper::new(self.cli.clone())
                .ensure_runtime_available()
                .await?;
        }

        let model = self.config.model_name.clone();
        self.verify_model(&model).await?;
        self.advance(SessionState::ModelVerified);

        // the chat client is model-agnostic; the model is bound per agent
        println!("✅ Model configured (temperature {})", self.config.temperature);
        self.advance(SessionState::ModelConfigured);

        if let Err(e) = retrieval::seed_example_documents(&self.config.data_dir) {
            warn!(error = %e, "Could not prepare the data directory");
            println!("⚠️  Could not prepare {}: {}", self.config.data_dir.display(), e);
        }
        self.advance(SessionState::DocumentsReady);

        let outcome =
            retrieval::build_index(&self.config.data_dir, self.embedder.clone(), DEFAULT_TOP_K)
                .await;
        self.retriever = outcome.retriever;
        self.advance(SessionState::IndexReady);

        println!("✅ Base tools ready: knowledge_search, calculator, web_search");
        self.advance(SessionState::ToolsReady);

        self.topology = Some(self.build_topology(&model)?);
        println!("✅ Multiagent system created");
        self.advance(SessionState::Running);

        println!("\n{}", "=".repeat(80));
        println!("🚀 Multiagent system initialized");
        println!("{}", "=".repeat(80));
        Ok(())
    }

    fn advance(&mut self, state: SessionState) {
        info!(from = %self.state, to = %state, "Session state changed");
        self.state = state;
    }

    async fn verify_model(&self, model: &str) -> Result<(), SessionError> {
        match self.cli.ensure_model(model).await {
            Ok(_) => Ok(()),
            Err(source) => {
                println!("❌ Could not verify or download model '{}': {}", model, source);
                Err(SessionError::ModelUnavailable {
                    model: model.to_string(),
                    source,
                })
            }
        }
    }

    fn build_topology(&self, model: &str) -> Result<Topology, SessionError> {
        let config = TopologyConfig {
            model: model.to_string(),
            temperature: self.config.temperature,
            max_iterations: self.config.max_iterations,
            verbose: self.config.verbose,
        };
        Ok(agent::build(self.chat.clone(), self.retriever.clone(), &config)?)
    }

    /// Route a query through the coordinator. Always returns text.
    pub async fn respond(&mut self, query: &str) -> String {
        let Some(coordinator) = self.topology.as_ref().map(|t| t.coordinator.clone()) else {
            return "Error: the multiagent system is not initialized.".to_string();
        };

        if self.config.verbose {
            println!("\n📝 Query received: {}", query);
            println!("🤖 Processing with the multiagent system...");
        }

        let start = Instant::now();
        match coordinator.chat(query).await {
            Ok(reply) => {
                self.queries_answered += 1;
                if self.config.verbose {
                    println!("⏱️ Response time: {:.2} seconds", start.elapsed().as_secs_f64());
                }
                reply.response
            }
            Err(e) => {
                warn!(error = %e, "Query failed");
                format!("Error processing the query: {}", e)
            }
        }
    }

    /// Verify `model` and rebuild every agent on it.
    ///
    /// The model name and agents only change once the new tree is built,
    /// so a failed switch leaves the session exactly as it was.
    pub async fn switch_model(&mut self, model: &str) -> Result<(), SessionError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(SessionError::Configuration("model name is empty".to_string()));
        }
        if !self.is_running() {
            return Err(SessionError::NotRunning);
        }

        println!("🔄 Switching to model '{}'...", model);
        self.verify_model(model).await?;
        let topology = self.build_topology(model)?;

        info!(from = %self.config.model_name, to = model, "Model switched");
        self.config.model_name = model.to_string();
        self.topology = Some(topology);
        Ok(())
    }

    /// Raw `ollama list` output.
    pub async fn list_models(&self) -> Result<String, RegistryError> {
        self.cli.list_raw().await
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            model: self.config.model_name.clone(),
            embed_model: self.config.embed_model().to_string(),
            temperature: self.config.temperature,
            timeout: self.config.timeout,
            data_dir: self.config.data_dir.display().to_string(),
            state: self.state,
            retriever: self.retriever.kind(),
            agents_active: self.topology.is_some(),
            queries_answered: self.queries_answered,
            coordinator_runs: metrics::successful_runs("coordinator"),
        }
    }

    /// Run the scripted demo queries.
    pub async fn run_examples(&mut self) {
        println!("\n{}", "=".repeat(80));
        println!("🧪 Running example queries");
        println!("{}", "=".repeat(80));

        for (i, query) in EXAMPLE_QUERIES.iter().enumerate() {
            println!("\nExample {}: {}", i + 1, query);
            let answer = self.respond(query).await;
            println!("\nAnswer: {}", answer);
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        println!("\n{}", "=".repeat(80));
        println!("✅ Examples finished");
        println!("{}", "=".repeat(80));
    }
}
