//! Prometheus metrics for agent runs, tool calls and model latency
//!
//! All metrics live in one registry. The `status` command reads the
//! coordinator's success counter from it.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry, HistogramVec,
    IntCounterVec, Registry,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    /// Agent runs by agent name and outcome (success, max_iterations, error)
    pub static ref AGENT_RUNS: IntCounterVec = register_int_counter_vec_with_registry!(
        "multiagent_agent_runs_total",
        "Agent chat turns by outcome",
        &["agent", "status"],
        REGISTRY
    )
    .expect("metric can be created");

    /// Reasoning-loop iterations per agent run
    pub static ref AGENT_ITERATIONS: HistogramVec = register_histogram_vec_with_registry!(
        "multiagent_agent_iterations",
        "LLM calls needed per agent turn",
        &["agent"],
        vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0],
        REGISTRY
    )
    .expect("metric can be created");

    /// Tool invocations by tool name
    pub static ref TOOL_CALLS: IntCounterVec = register_int_counter_vec_with_registry!(
        "multiagent_tool_calls_total",
        "Tool invocations",
        &["tool"],
        REGISTRY
    )
    .expect("metric can be created");

    /// Wall time of a single /api/chat call
    pub static ref LLM_CALL_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        "multiagent_llm_call_duration_seconds",
        "Duration of one chat completion",
        &["model"],
        vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0],
        REGISTRY
    )
    .expect("metric can be created");
}

/// Total successful agent runs for `agent`.
pub fn successful_runs(agent: &str) -> u64 {
    AGENT_RUNS.with_label_values(&[agent, "success"]).get()
}

/// Total calls made to `tool`.
pub fn tool_calls(tool: &str) -> u64 {
    TOOL_CALLS.with_label_values(&[tool]).get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_registered() {
        TOOL_CALLS.with_label_values(&["metrics_test_tool"]).inc();
        assert!(tool_calls("metrics_test_tool") >= 1);

        let names: Vec<String> = REGISTRY.gather().iter().map(|f| f.get_name().to_string()).collect();
        assert!(names.contains(&"multiagent_tool_calls_total".to_string()));
    }
}
