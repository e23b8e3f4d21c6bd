//! The agent's owned, ordered collection of strategies.

use switchback_core::{AgentConfig, Strategy, StrategyKind, Task};
use switchback_strategies::RuleBasedPlanner;
use tracing::debug;

use crate::metrics::MetricsLedger;
use crate::policy::{Candidate, SelectionPolicy};

/// Strategies in configured order, always including a planner.
pub struct StrategySet {
    strategies: Vec<Box<dyn Strategy>>,
    fallback: usize,
}

impl StrategySet {
    /// Take ownership of `strategies`. A planner is appended when none is present.
    pub fn new(mut strategies: Vec<Box<dyn Strategy>>) -> Self {
        let fallback = match strategies
            .iter()
            .position(|s| s.kind() == StrategyKind::Planner)
        {
            Some(i) => i,
            None => {
                debug!("No planner configured, adding fallback planner");
                strategies.push(Box::new(RuleBasedPlanner::new()));
                strategies.len() - 1
            }
        };
        Self {
            strategies,
            fallback,
        }
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn get(&self, index: usize) -> &dyn Strategy {
        self.strategies[index].as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> &mut dyn Strategy {
        self.strategies[index].as_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Strategy> {
        self.strategies.iter().map(|s| s.as_ref())
    }

    pub fn fallback(&self) -> usize {
        self.fallback
    }

    /// Indices of strategies that support `task`, in configured order.
    pub fn eligible(&self, task: &Task, config: &AgentConfig) -> Vec<usize> {
        self.strategies
            .iter()
            .enumerate()
            .filter(|(_, s)| s.supports(task, config))
            .map(|(i, _)| i)
            .collect()
    }

    /// Ask `policy` to choose among eligible strategies. Falls back to the planner.
    pub fn select(
        &self,
        policy: &mut dyn SelectionPolicy,
        task: &Task,
        config: &AgentConfig,
        metrics: &MetricsLedger,
    ) -> usize {
        let eligible = self.eligible(task, config);
        let candidates: Vec<Candidate<'_>> = eligible
            .iter()
            .map(|&i| Candidate {
                name: self.strategies[i].name(),
                kind: self.strategies[i].kind(),
            })
            .collect();

        match policy.select(&candidates, metrics) {
            Some(choice) if choice < eligible.len() => eligible[choice],
            _ => self.fallback,
        }
    }
}
