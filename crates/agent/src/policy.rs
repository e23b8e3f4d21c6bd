//! Selection policies: which eligible strategy runs next.
//!
//! Policies see only the eligible candidates (in configured order) and the
//! metrics ledger. They return an index into the candidate slice, or `None`
//! when the slice is empty; the caller falls back to the planner then.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use switchback_core::{PolicyConfig, PolicyMode, StrategyKind};

use crate::metrics::MetricsLedger;

/// A strategy offered to a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub name: &'a str,
    pub kind: StrategyKind,
}

pub trait SelectionPolicy: Send {
    fn mode(&self) -> PolicyMode;

    fn select(&mut self, candidates: &[Candidate<'_>], metrics: &MetricsLedger) -> Option<usize>;
}

/// `success_weight * success_rate - latency_weight * avg_latency`.
pub fn strategy_value(name: &str, metrics: &MetricsLedger, weights: &PolicyConfig) -> f64 {
    weights.success_weight * metrics.success_rate(name)
        - weights.latency_weight * metrics.avg_latency(name)
}

/// Build the policy named by `config.mode`.
pub fn policy_for(config: &PolicyConfig) -> Box<dyn SelectionPolicy> {
    match config.mode {
        PolicyMode::Rules => Box::new(RulesPolicy),
        PolicyMode::Score => Box::new(ScorePolicy::new(config.clone())),
        PolicyMode::Bandit => Box::new(BanditPolicy::new(config.clone())),
    }
}

/// Fixed priority: reasoner, then retriever, then whatever comes first.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesPolicy;

impl SelectionPolicy for RulesPolicy {
    fn mode(&self) -> PolicyMode {
        PolicyMode::Rules
    }

    fn select(&mut self, candidates: &[Candidate<'_>], _metrics: &MetricsLedger) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        [StrategyKind::Reasoner, StrategyKind::Retriever]
            .iter()
            .find_map(|kind| candidates.iter().position(|c| c.kind == *kind))
            .or(Some(0))
    }
}

/// Greedy on [`strategy_value`]. Ties go to the earlier candidate.
#[derive(Debug, Clone)]
pub struct ScorePolicy {
    weights: PolicyConfig,
}

impl ScorePolicy {
    pub fn new(weights: PolicyConfig) -> Self {
        Self { weights }
    }
}

impl SelectionPolicy for ScorePolicy {
    fn mode(&self) -> PolicyMode {
        PolicyMode::Score
    }

    fn select(&mut self, candidates: &[Candidate<'_>], metrics: &MetricsLedger) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, c) in candidates.iter().enumerate() {
            let value = strategy_value(c.name, metrics, &self.weights);
            match best {
                Some((_, v)) if value <= v => {}
                _ => best = Some((i, value)),
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Epsilon-greedy: explore uniformly with probability `epsilon`, otherwise
/// exploit the highest [`strategy_value`].
pub struct BanditPolicy<R = StdRng> {
    weights: PolicyConfig,
    rng: R,
}

impl BanditPolicy<StdRng> {
    /// Bandit seeded from the OS.
    pub fn new(weights: PolicyConfig) -> Self {
        Self::with_rng(weights, StdRng::from_os_rng())
    }

    /// Bandit with a deterministic random stream.
    pub fn seeded(weights: PolicyConfig, seed: u64) -> Self {
        Self::with_rng(weights, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> BanditPolicy<R> {
    pub fn with_rng(weights: PolicyConfig, rng: R) -> Self {
        Self { weights, rng }
    }

    fn exploit(&self, candidates: &[Candidate<'_>], metrics: &MetricsLedger) -> usize {
        let mut ranked: Vec<(usize, f64)> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (i, strategy_value(c.name, metrics, &self.weights)))
            .collect();
        // Stable sort: equal values keep list order.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked[0].0
    }
}

impl<R: Rng + Send> SelectionPolicy for BanditPolicy<R> {
    fn mode(&self) -> PolicyMode {
        PolicyMode::Bandit
    }

    fn select(&mut self, candidates: &[Candidate<'_>], metrics: &MetricsLedger) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        if self.rng.random::<f64>() < self.weights.epsilon {
            return Some(self.rng.random_range(0..candidates.len()));
        }
        Some(self.exploit(candidates, metrics))
    }
}
