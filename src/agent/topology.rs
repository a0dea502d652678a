//! Builds the coordinator → specialists → tools delegation tree
//!
//! ```text
//!                 coordinator
//!                /           \
//!         investigator      analyst
//!          /        \           |
//! knowledge_search  web_search  calculator
//! ```
//!
//! The tree is always two levels deep. Switching models builds a new tree
//! from scratch.

use std::sync::Arc;

use tracing::info;

use super::prompts::{ANALYST_PROMPT, COORDINATOR_PROMPT, INVESTIGATOR_PROMPT};
use super::{Agent, AgentConfig, AgentError, AgentTool};
use crate::ollama::ChatBackend;
use crate::retrieval::Retriever;
use crate::tools::{CalculatorTool, KnowledgeTool, Tool, ToolSet, WebSearchTool};

/// Settings shared by every agent in the tree
#[derive(Debug, Clone)]
pub struct TopologyConfig {
    pub model: String,
    pub temperature: f32,
    pub max_iterations: usize,
    pub verbose: bool,
}

/// The live agents of a session
pub struct Topology {
    pub coordinator: Arc<Agent>,
    pub investigator: Arc<Agent>,
    pub analyst: Arc<Agent>,
}

impl Topology {
    pub fn model(&self) -> &str {
        &self.coordinator.config().model
    }
}

/// The three leaf tools, created fresh for each tree.
pub fn base_tools(retriever: Arc<dyn Retriever>) -> (Arc<dyn Tool>, Arc<dyn Tool>, Arc<dyn Tool>) {
    let knowledge: Arc<dyn Tool> = Arc::new(KnowledgeTool::new(retriever));
    let calculator: Arc<dyn Tool> = Arc::new(CalculatorTool);
    let web: Arc<dyn Tool> = Arc::new(WebSearchTool);
    (knowledge, calculator, web)
}

/// Construct the specialists, wrap them as tools and bind them to the coordinator.
pub fn build(
    backend: Arc<dyn ChatBackend>,
    retriever: Arc<dyn Retriever>,
    config: &TopologyConfig,
) -> Result<Topology, AgentError> {
    let agent_config = |name: &str, prompt: &str| AgentConfig {
        name: name.to_string(),
        model: config.model.clone(),
        system_prompt: prompt.to_string(),
        temperature: config.temperature,
        max_iterations: config.max_iterations,
        verbose: config.verbose,
    };

    let (knowledge, calculator, web) = base_tools(retriever);

    let investigator = Arc::new(Agent::new(
        backend.clone(),
        ToolSet::from_tools([knowledge, web])?,
        agent_config("investigator", INVESTIGATOR_PROMPT),
    ));

    let analyst = Arc::new(Agent::new(
        backend.clone(),
        ToolSet::from_tools([calculator])?,
        agent_config("analyst", ANALYST_PROMPT),
    ));

    let delegates = ToolSet::from_tools([
        Arc::new(AgentTool::new(
            "investigator",
            "Ask the investigator agent to look up information",
            investigator.clone(),
        )) as Arc<dyn Tool>,
        Arc::new(AgentTool::new(
            "analyst",
            "Ask the analyst agent to perform calculations and numerical analysis",
            analyst.clone(),
        )) as Arc<dyn Tool>,
    ])?;

    let coordinator = Arc::new(Agent::new(
        backend,
        delegates,
        agent_config("coordinator", COORDINATOR_PROMPT),
    ));

    info!(model = %config.model, "Agent topology built");

    Ok(Topology {
        coordinator,
        investigator,
        analyst,
    })
}
