//! The adaptive strategy loop, the heart of Switchback.
//!
//! Each run follows a **Select → Act → Evaluate** cycle:
//!
//! 1. **Gate** the task text through the deny-list
//! 2. **Select** a strategy with the configured policy (`rules`, `score`, `bandit`)
//! 3. **Act**: run one step and account the result in the metrics ledger and history
//! 4. **Evaluate** the trailing window; on a rebranch signal, consult the
//!    policy again and hand state over if it picks someone else
//!
//! The loop ends on a step scoring at least [`EARLY_STOP_SCORE`] or after
//! `max_steps` steps.

pub mod history;
pub mod loop_runner;
pub mod metrics;
pub mod policy;
pub mod rebranch;
pub mod strategy_set;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use history::{HistoryEntry, HistoryLog, WindowStats};
pub use loop_runner::{Agent, EARLY_STOP_SCORE, run};
pub use metrics::{MetricsLedger, SUCCESS_THRESHOLD, StrategyMetrics};
pub use policy::{
    BanditPolicy, Candidate, RulesPolicy, ScorePolicy, SelectionPolicy, policy_for, strategy_value,
};
pub use rebranch::{Cooldown, Evaluation, RebranchEvaluator};
pub use strategy_set::StrategySet;
