//! Rebranch decision: is the active strategy underperforming?

use switchback_core::Thresholds;

use crate::history::{HistoryLog, WindowStats};

/// Steps left before rebranch evaluation resumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cooldown {
    remaining: u32,
}

impl Cooldown {
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Consume one step of cooldown. Returns `true` if the step was skipped.
    pub fn tick(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, steps: u32) {
        self.remaining = steps;
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// Cooldown was positive; it has been decremented and nothing was checked.
    CoolingDown { remaining: u32 },
    /// No history yet.
    NoData,
    /// The window is within thresholds.
    Healthy(WindowStats),
    /// The window breached a threshold; the policy should be consulted.
    Rebranch(WindowStats),
}

impl Evaluation {
    pub fn should_rebranch(&self) -> bool {
        matches!(self, Self::Rebranch(_))
    }
}

#[derive(Debug, Clone)]
pub struct RebranchEvaluator {
    thresholds: Thresholds,
    cooldown: Cooldown,
}

impl RebranchEvaluator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            cooldown: Cooldown::default(),
        }
    }

    pub fn cooldown(&self) -> Cooldown {
        self.cooldown
    }

    /// Evaluate after a step.
    ///
    /// Signals when the trailing window's mean success is below
    /// `min_success_rate` or its mean latency is above `max_latency_s`.
    pub fn evaluate(&mut self, history: &HistoryLog) -> Evaluation {
        if self.cooldown.tick() {
            return Evaluation::CoolingDown {
                remaining: self.cooldown.remaining(),
            };
        }

        let window = self.thresholds.eval_interval_steps.max(1);
        let Some(stats) = history.window_stats(window) else {
            return Evaluation::NoData;
        };

        if stats.mean_success < self.thresholds.min_success_rate
            || stats.mean_latency_s > self.thresholds.max_latency_s
        {
            Evaluation::Rebranch(stats)
        } else {
            Evaluation::Healthy(stats)
        }
    }

    /// Spend one step of cooldown without evaluating. Used after the final
    /// step of a run, where no switch could follow.
    pub fn tick_only(&mut self) {
        self.cooldown.tick();
    }

    /// Record an executed switch.
    pub fn switched(&mut self) {
        self.cooldown.reset(self.thresholds.cooldown_steps);
    }
}
