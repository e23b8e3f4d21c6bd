//! Per-strategy running counters.

use serde::Serialize;
use std::collections::BTreeMap;
use switchback_core::RunResult;
use switchback_core::run::clamp_latency;

/// A step counts as a success for accounting purposes at or above this score.
///
/// Fixed, and distinct from the configurable rebranch `min_success_rate`.
pub const SUCCESS_THRESHOLD: f64 = 0.6;

/// Counters for one strategy. `attempts >= successes` always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StrategyMetrics {
    pub attempts: u64,
    pub successes: u64,
    pub total_latency_s: f64,
}

impl StrategyMetrics {
    fn record(&mut self, result: &RunResult) {
        self.attempts += 1;
        self.total_latency_s += clamp_latency(result.latency_s);
        if result.success_score >= SUCCESS_THRESHOLD {
            self.successes += 1;
        }
    }

    /// `successes / max(1, attempts)`, so `0.0` before the first attempt.
    pub fn success_rate(&self) -> f64 {
        self.successes as f64 / self.attempts.max(1) as f64
    }

    /// `total_latency / max(1, attempts)`.
    pub fn avg_latency(&self) -> f64 {
        self.total_latency_s / self.attempts.max(1) as f64
    }
}

/// All strategies' counters, keyed by strategy name.
///
/// Never reset: an agent instance keeps learning across runs.
#[derive(Debug, Clone, Default)]
pub struct MetricsLedger {
    by_strategy: BTreeMap<String, StrategyMetrics>,
}

impl MetricsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account one step's result against its producing strategy.
    pub fn update(&mut self, result: &RunResult) {
        self.by_strategy
            .entry(result.strategy_name.clone())
            .or_default()
            .record(result);
    }

    pub fn get(&self, name: &str) -> Option<&StrategyMetrics> {
        self.by_strategy.get(name)
    }

    pub fn success_rate(&self, name: &str) -> f64 {
        self.get(name).map_or(0.0, StrategyMetrics::success_rate)
    }

    pub fn avg_latency(&self, name: &str) -> f64 {
        self.get(name).map_or(0.0, StrategyMetrics::avg_latency)
    }

    pub fn total_attempts(&self) -> u64 {
        self.by_strategy.values().map(|m| m.attempts).sum()
    }

    /// Strategies with at least one attempt, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StrategyMetrics)> {
        self.by_strategy.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[cfg(test)]
    pub(crate) fn seed(&mut self, name: &str, metrics: StrategyMetrics) {
        self.by_strategy.insert(name.to_string(), metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, score: f64, latency: f64) -> RunResult {
        RunResult::new("out", score, latency, name)
    }

    #[test]
    fn unknown_strategy_reads_zero() {
        let ledger = MetricsLedger::new();
        assert_eq!(ledger.success_rate("nobody"), 0.0);
        assert_eq!(ledger.avg_latency("nobody"), 0.0);
        assert_eq!(StrategyMetrics::default().success_rate(), 0.0);
    }

    #[test]
    fn success_threshold_is_inclusive() {
        let mut ledger = MetricsLedger::new();
        ledger.update(&result("a", 0.6, 1.0));
        ledger.update(&result("a", 0.59, 3.0));

        let m = ledger.get("a").unwrap();
        assert_eq!(m.attempts, 2);
        assert_eq!(m.successes, 1);
        assert_eq!(ledger.success_rate("a"), 0.5);
        assert_eq!(ledger.avg_latency("a"), 2.0);
    }

    #[test]
    fn bad_latency_is_clamped() {
        let mut ledger = MetricsLedger::new();
        let mut r = result("a", 0.9, 0.0);
        r.latency_s = -5.0;
        ledger.update(&r);
        r.latency_s = f64::NAN;
        ledger.update(&r);
        r.latency_s = f64::INFINITY;
        ledger.update(&r);

        let m = ledger.get("a").unwrap();
        assert_eq!(m.total_latency_s, 0.0);
        assert_eq!(m.attempts, 3);
    }

    #[test]
    fn invariants_hold_over_many_updates() {
        let mut ledger = MetricsLedger::new();
        for i in 0..100 {
            let score = (i % 10) as f64 / 10.0;
            ledger.update(&result(if i % 3 == 0 { "a" } else { "b" }, score, i as f64 * 0.01));
        }
        for (_, m) in ledger.iter() {
            assert!(m.attempts >= m.successes);
            assert!((0.0..=1.0).contains(&m.success_rate()));
            assert!(m.avg_latency() >= 0.0);
        }
        assert_eq!(ledger.total_attempts(), 100);
    }
}
