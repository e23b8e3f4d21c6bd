//! Task input and per-step result types.

use serde::{Deserialize, Serialize};

/// Strategy name reported on results produced by the safety gate.
pub const SAFETY_STRATEGY_NAME: &str = "Safety";

/// Strategy name reported on the sentinel result of a run that never stepped.
pub const NO_RUN_STRATEGY_NAME: &str = "None";

/// Output text of a task rejected by the safety gate.
pub const BLOCKED_MESSAGE: &str = "Task blocked by safety filter.";

/// The immutable input of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Free-text description of what to do.
    pub description: String,

    /// Target-language hint (e.g. "python"), consumed by code-oriented strategies.
    pub language: String,
}

impl Task {
    pub fn new(description: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            language: language.into(),
        }
    }
}

/// The output of one strategy invocation.
///
/// Produced once per step and never mutated afterwards: the metrics ledger
/// and the history log both read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Text produced by the strategy.
    pub output: String,

    /// Quality estimate in `[0, 1]`.
    pub success_score: f64,

    /// Wall-clock seconds the attempt took (`>= 0`).
    pub latency_s: f64,

    /// Name of the strategy that produced this result.
    pub strategy_name: String,

    /// Open-ended extra data (model used, reference count, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl RunResult {
    /// Build a result, clamping the score into `[0, 1]` and the latency to `>= 0`.
    pub fn new(
        output: impl Into<String>,
        success_score: f64,
        latency_s: f64,
        strategy_name: impl Into<String>,
    ) -> Self {
        Self {
            output: output.into(),
            success_score: clamp_unit(success_score),
            latency_s: clamp_latency(latency_s),
            strategy_name: strategy_name.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_meta(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The result returned for a task rejected by the safety gate.
    pub fn blocked() -> Self {
        Self::new(BLOCKED_MESSAGE, 0.0, 0.0, SAFETY_STRATEGY_NAME)
    }

    /// The sentinel returned when the loop never executed a step.
    pub fn empty() -> Self {
        Self::new("", 0.0, 0.0, NO_RUN_STRATEGY_NAME)
    }
}

fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Negative and non-finite latencies collapse to zero.
pub fn clamp_latency(latency_s: f64) -> f64 {
    if latency_s.is_finite() && latency_s > 0.0 {
        latency_s
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_score_and_latency() {
        let r = RunResult::new("x", 1.7, -3.0, "planner");
        assert_eq!(r.success_score, 1.0);
        assert_eq!(r.latency_s, 0.0);

        let r = RunResult::new("x", f64::NAN, f64::INFINITY, "planner");
        assert_eq!(r.success_score, 0.0);
        assert_eq!(r.latency_s, 0.0);
    }

    #[test]
    fn blocked_result_shape() {
        let r = RunResult::blocked();
        assert_eq!(r.output, BLOCKED_MESSAGE);
        assert_eq!(r.success_score, 0.0);
        assert_eq!(r.strategy_name, SAFETY_STRATEGY_NAME);
    }

    #[test]
    fn empty_result_shape() {
        let r = RunResult::empty();
        assert!(r.output.is_empty());
        assert_eq!(r.success_score, 0.0);
        assert_eq!(r.strategy_name, NO_RUN_STRATEGY_NAME);
    }

    #[test]
    fn metadata_is_skipped_when_empty() {
        let json = serde_json::to_string(&RunResult::new("ok", 0.5, 0.1, "planner")).unwrap();
        assert!(!json.contains("metadata"));

        let result = RunResult::new("ok", 0.5, 0.1, "planner").with_meta("refs", 3);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"refs\":3"));
    }
}
