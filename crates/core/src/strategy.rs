//! Strategy trait: the abstraction over ways of attempting a task.
//!
//! The control loop picks one strategy at a time, runs it step by step, and
//! may swap it for another when recent results look poor. When that happens
//! the outgoing strategy can hand a small bag of typed state to the incoming
//! one.
//!
//! The set of strategy kinds is closed ([`StrategyKind`]); configuration names
//! kinds, and the strategies crate maps each kind to its implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::agent::AgentConfig;
use crate::error::StrategyError;
use crate::run::{RunResult, Task};

/// The closed set of strategy kinds a deployment can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Deterministic planning; always supported, the universal fallback.
    Planner,
    /// Code-search retrieval; supported when a search backend is configured.
    Retriever,
    /// LLM reasoning; supported when completion credentials are configured.
    Reasoner,
}

impl StrategyKind {
    /// All kinds, in default configuration order.
    pub const ALL: [StrategyKind; 3] = [Self::Planner, Self::Retriever, Self::Reasoner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Retriever => "retriever",
            Self::Reasoner => "reasoner",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planner" => Ok(Self::Planner),
            "retriever" => Ok(Self::Retriever),
            "reasoner" => Ok(Self::Reasoner),
            other => Err(format!(
                "unknown strategy '{other}' (expected planner, retriever or reasoner)"
            )),
        }
    }
}

/// A scalar value carried across a strategy handoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl StateValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for StateValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for StateValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for StateValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for StateValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for StateValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// State exported by a departing strategy and offered to its successor.
pub type HandoffState = BTreeMap<String, StateValue>;

/// The core Strategy trait.
///
/// Lifecycle per activation: (`accept_handoff` on a switch) → `warmup` →
/// `run` once per step until the loop terminates or switches away, at which
/// point `handoff_state` is read.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// The unique name of this strategy (e.g., "RuleBasedPlanner").
    fn name(&self) -> &str;

    /// Which kind this strategy implements.
    fn kind(&self) -> StrategyKind;

    /// Whether this strategy can attempt the task. Must be side-effect-free.
    fn supports(&self, _task: &Task, _config: &AgentConfig) -> bool {
        true
    }

    /// One-time preparation each time the strategy becomes active.
    async fn warmup(&mut self, _task: &Task, _config: &AgentConfig) -> Result<(), StrategyError> {
        Ok(())
    }

    /// Perform one attempt.
    ///
    /// Collaborator failures must be folded into a low-score result; this
    /// method has no error channel.
    async fn run(&mut self, task: &Task, config: &AgentConfig) -> RunResult;

    /// State to preserve for whichever strategy takes over.
    fn handoff_state(&self) -> HandoffState {
        HandoffState::new()
    }

    /// Receive the previous strategy's exported state. Unknown keys are ignored.
    fn accept_handoff(&mut self, _state: &HandoffState) {}
}
