//! Agent configuration types: policy selection and rebranch thresholds.

use serde::{Deserialize, Serialize};
use crate::error::Error;
use crate::strategy::StrategyKind;

/// Configuration for one agent's behavior. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Default target-language hint for code-oriented strategies
    #[serde(default = "default_language")]
    pub language: String,

    /// Strategy selection policy
    #[serde(default)]
    pub policy: PolicyConfig,

    /// When to consider switching strategies
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Enabled strategies, in priority order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,
}

fn default_language() -> String {
    "python".into()
}
fn default_strategies() -> Vec<StrategyKind> {
    StrategyKind::ALL.to_vec()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            policy: PolicyConfig::default(),
            thresholds: Thresholds::default(),
            strategies: default_strategies(),
        }
    }
}

impl AgentConfig {
    /// Check value ranges. Called before any run starts.
    pub fn validate(&self) -> Result<(), Error> {
        let p = &self.policy;
        if !(0.0..=1.0).contains(&p.epsilon) {
            return Err(config_error("policy.epsilon must be between 0.0 and 1.0"));
        }
        if !p.latency_weight.is_finite() || p.latency_weight < 0.0 {
            return Err(config_error("policy.latency_weight must be a finite value >= 0"));
        }
        if !p.success_weight.is_finite() || p.success_weight < 0.0 {
            return Err(config_error("policy.success_weight must be a finite value >= 0"));
        }

        let t = &self.thresholds;
        if !(0.0..=1.0).contains(&t.min_success_rate) {
            return Err(config_error("thresholds.min_success_rate must be between 0.0 and 1.0"));
        }
        if t.max_latency_s.is_nan() || t.max_latency_s <= 0.0 {
            return Err(config_error("thresholds.max_latency_s must be > 0"));
        }
        if t.eval_interval_steps == 0 {
            return Err(config_error("thresholds.eval_interval_steps must be >= 1"));
        }

        Ok(())
    }
}

fn config_error(message: &str) -> Error {
    Error::Config {
        message: message.into(),
    }
}

/// Which selection algorithm picks the active strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Fixed priority: reasoner, then retriever, then configured order
    Rules,
    /// Greedy on the weighted success/latency value
    Score,
    /// Epsilon-greedy over the same value (default)
    #[default]
    Bandit,
}

impl std::fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rules => write!(f, "rules"),
            Self::Score => write!(f, "score"),
            Self::Bandit => write!(f, "bandit"),
        }
    }
}

impl std::str::FromStr for PolicyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" => Ok(Self::Rules),
            "score" => Ok(Self::Score),
            "bandit" => Ok(Self::Bandit),
            other => Err(Error::Config {
                message: format!("unknown policy mode '{other}' (expected rules, score or bandit)"),
            }),
        }
    }
}

/// Policy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub mode: PolicyMode,

    /// Exploration probability for the bandit policy
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Penalty per second of average latency
    #[serde(default = "default_latency_weight")]
    pub latency_weight: f64,

    /// Reward per unit of success rate
    #[serde(default = "default_success_weight")]
    pub success_weight: f64,
}

fn default_epsilon() -> f64 {
    0.15
}
fn default_latency_weight() -> f64 {
    0.25
}
fn default_success_weight() -> f64 {
    0.75
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mode: PolicyMode::default(),
            epsilon: default_epsilon(),
            latency_weight: default_latency_weight(),
            success_weight: default_success_weight(),
        }
    }
}

/// Rebranch thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Mean latency over the window above which a switch is considered
    #[serde(default = "default_max_latency")]
    pub max_latency_s: f64,

    /// Mean success over the window below which a switch is considered
    #[serde(default = "default_min_success_rate")]
    pub min_success_rate: f64,

    /// Trailing window size, in steps
    #[serde(default = "default_eval_interval")]
    pub eval_interval_steps: usize,

    /// Steps to skip evaluation after a switch
    #[serde(default = "default_cooldown")]
    pub cooldown_steps: u32,
}

fn default_max_latency() -> f64 {
    10.0
}
fn default_min_success_rate() -> f64 {
    0.6
}
fn default_eval_interval() -> usize {
    2
}
fn default_cooldown() -> u32 {
    1
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_latency_s: default_max_latency(),
            min_success_rate: default_min_success_rate(),
            eval_interval_steps: default_eval_interval(),
            cooldown_steps: default_cooldown(),
        }
    }
}
