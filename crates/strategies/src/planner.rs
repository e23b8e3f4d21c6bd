//! Rule-based planner: a fixed, language-aware plan outline.
//!
//! Needs no collaborator, so it is always supported and serves as the
//! fallback when nothing else is eligible.

use async_trait::async_trait;
use std::time::Instant;
use switchback_core::{AgentConfig, HandoffState, RunResult, Strategy, StrategyKind, Task};

pub const NAME: &str = "RuleBasedPlanner";

/// Confidence reported for every plan.
pub const PLAN_SCORE: f64 = 0.55;

const PLAN_STEPS: &[&str] = &[
    "1) Restate the task succinctly",
    "2) Identify inputs/outputs",
    "3) Draft an algorithm",
    "4) Implement minimal solution",
    "5) Add tests and edge cases",
    "6) Optimize if needed",
];

#[derive(Debug, Default)]
pub struct RuleBasedPlanner {
    last_language: Option<String>,
}

impl RuleBasedPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    fn render(language: &str) -> String {
        let mut lines = Vec::with_capacity(PLAN_STEPS.len() + 2);
        lines.push(format!("Language: {language}"));
        lines.push("Steps:".to_string());
        lines.extend(PLAN_STEPS.iter().map(|s| s.to_string()));
        lines.join("\n")
    }
}

#[async_trait]
impl Strategy for RuleBasedPlanner {
    fn name(&self) -> &str {
        NAME
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Planner
    }

    async fn run(&mut self, task: &Task, _config: &AgentConfig) -> RunResult {
        let start = Instant::now();
        let output = Self::render(&task.language);
        self.last_language = Some(task.language.clone());
        RunResult::new(output, PLAN_SCORE, start.elapsed().as_secs_f64(), NAME)
            .with_meta("plan_steps", PLAN_STEPS.len())
    }

    fn handoff_state(&self) -> HandoffState {
        let mut state = HandoffState::new();
        state.insert("plan_steps".into(), (PLAN_STEPS.len() as i64).into());
        if let Some(language) = &self.last_language {
            state.insert("language".into(), language.as_str().into());
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plan_mentions_language() {
        let mut planner = RuleBasedPlanner::new();
        let task = Task::new("reverse a linked list", "rust");
        let result = planner.run(&task, &AgentConfig::default()).await;

        assert_eq!(result.strategy_name, "RuleBasedPlanner");
        assert_eq!(result.success_score, 0.55);
        assert!(result.latency_s >= 0.0);
        assert!(result.output.starts_with("Language: rust\nSteps:\n"));
        assert!(result.output.ends_with("6) Optimize if needed"));
        assert_eq!(result.metadata["plan_steps"], 6);
    }

    #[test]
    fn always_supported() {
        let planner = RuleBasedPlanner::new();
        assert!(planner.supports(&Task::new("", ""), &AgentConfig::default()));
        assert_eq!(planner.kind(), StrategyKind::Planner);
    }

    #[tokio::test]
    async fn handoff_exports_language_after_run() {
        let mut planner = RuleBasedPlanner::new();
        assert!(!planner.handoff_state().contains_key("language"));

        planner
            .run(&Task::new("x", "go"), &AgentConfig::default())
            .await;
        let state = planner.handoff_state();
        assert_eq!(state["language"].as_str(), Some("go"));
        assert_eq!(state["plan_steps"].as_i64(), Some(6));
    }
}
