//! The adaptive control loop.
//!
//! One run: safety check, select, warm up, then step until the score
//! clears [`EARLY_STOP_SCORE`] or `max_steps` is reached. After every
//! non-final step the rebranch evaluator may ask the policy to pick again;
//! a different pick hands state over and warms the new strategy up. The
//! final step only spends cooldown, which carries over to the next run.

use std::sync::Arc;

use chrono::Utc;
use switchback_config::{AppConfig, ConfigError};
use switchback_core::event::{DomainEvent, EventBus};
use switchback_core::run::NO_RUN_STRATEGY_NAME;
use switchback_core::{AgentConfig, RunResult, Strategy, StrategyError, Task};
use switchback_security::{SafetyFilter, SafetyVerdict};
use switchback_strategies::Collaborators;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::history::HistoryLog;
use crate::metrics::MetricsLedger;
use crate::policy::{SelectionPolicy, policy_for};
use crate::rebranch::{Evaluation, RebranchEvaluator};
use crate::strategy_set::StrategySet;

/// A step scoring at or above this ends the run.
pub const EARLY_STOP_SCORE: f64 = 0.8;

/// The adaptive agent. Metrics, history and cooldown outlive individual runs.
pub struct Agent {
    config: AgentConfig,
    strategies: StrategySet,
    policy: Box<dyn SelectionPolicy>,
    safety: SafetyFilter,
    metrics: MetricsLedger,
    history: HistoryLog,
    evaluator: RebranchEvaluator,
    event_bus: Arc<EventBus>,
}

impl Agent {
    /// Create an agent over an explicit strategy set. The policy follows `config.policy.mode`.
    ///
    /// The config is taken as given. Use [`Agent::try_new`] or
    /// [`Agent::from_config`] when it has not already been validated.
    pub fn new(
        config: AgentConfig,
        strategies: Vec<Box<dyn Strategy>>,
        safety: SafetyFilter,
    ) -> Self {
        Self {
            policy: policy_for(&config.policy),
            evaluator: RebranchEvaluator::new(config.thresholds.clone()),
            strategies: StrategySet::new(strategies),
            safety,
            metrics: MetricsLedger::new(),
            history: HistoryLog::new(),
            event_bus: Arc::new(EventBus::default()),
            config,
        }
    }

    /// Like [`Agent::new`], but rejects an invalid config.
    pub fn try_new(
        config: AgentConfig,
        strategies: Vec<Box<dyn Strategy>>,
        safety: SafetyFilter,
    ) -> Result<Self, switchback_core::Error> {
        config.validate()?;
        Ok(Self::new(config, strategies, safety))
    }

    /// Build the agent described by an application config.
    pub fn from_config(app: &AppConfig) -> Result<Self, ConfigError> {
        app.validate()?;
        let strategies = Collaborators::from_config(app).build_all(&app.agent.strategies);
        Ok(Self::new(
            app.agent.clone(),
            strategies,
            SafetyFilter::from_config(&app.safety),
        ))
    }

    /// Replace the selection policy (e.g. with a seeded bandit).
    pub fn with_policy(mut self, policy: Box<dyn SelectionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsLedger {
        &self.metrics
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn strategies(&self) -> &StrategySet {
        &self.strategies
    }

    /// Run one task to completion and return the last step's result.
    ///
    /// An empty `language_hint` falls back to the configured language.
    pub async fn run(&mut self, task: &str, language_hint: &str, max_steps: u32) -> RunResult {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("run", run_id = %run_id);
        self.run_inner(run_id, task, language_hint, max_steps)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &mut self,
        run_id: String,
        description: &str,
        language_hint: &str,
        max_steps: u32,
    ) -> RunResult {
        let language = match language_hint.trim() {
            "" => self.config.language.clone(),
            hint => hint.to_string(),
        };
        let task = Task::new(description, language);

        info!(
            policy = %self.policy.mode(),
            language = %task.language,
            max_steps,
            "Run started"
        );

        if let SafetyVerdict::Blocked { term } = self.safety.check(&task.description) {
            self.event_bus.publish(DomainEvent::TaskBlocked {
                run_id,
                matched_term: term,
                timestamp: Utc::now(),
            });
            return RunResult::blocked();
        }

        if max_steps == 0 {
            self.finish(&run_id, 0, NO_RUN_STRATEGY_NAME, 0.0, false);
            return RunResult::empty();
        }

        let mut active = self.select(&task);
        let mut warmup_error = self.activate(&run_id, active, &task, 1).await;
        let mut last: Option<RunResult> = None;
        let mut steps = 0;
        let mut early_stop = false;

        for step in 1..=max_steps {
            steps = step;
            let result = match warmup_error.take() {
                Some(e) => RunResult::new(
                    e.to_string(),
                    0.0,
                    0.0,
                    self.strategies.get(active).name(),
                )
                .with_meta("warmup_failed", true),
                None => self.strategies.get_mut(active).run(&task, &self.config).await,
            };

            self.metrics.update(&result);
            self.history.push(&result);
            debug!(
                step,
                strategy = %result.strategy_name,
                score = result.success_score,
                latency_s = result.latency_s,
                "Step completed"
            );
            self.event_bus.publish(DomainEvent::StepCompleted {
                run_id: run_id.clone(),
                step,
                strategy: result.strategy_name.clone(),
                success_score: result.success_score,
                latency_s: result.latency_s,
                timestamp: Utc::now(),
            });

            let done = result.success_score >= EARLY_STOP_SCORE;
            last = Some(result);
            if done || step == max_steps {
                early_stop = done && step < max_steps;
                self.evaluator.tick_only();
                break;
            }

            if let Evaluation::Rebranch(stats) = self.evaluator.evaluate(&self.history) {
                info!(
                    step,
                    mean_success = stats.mean_success,
                    mean_latency_s = stats.mean_latency_s,
                    "Rebranch signaled"
                );
                self.event_bus.publish(DomainEvent::RebranchSignaled {
                    run_id: run_id.clone(),
                    step,
                    mean_success: stats.mean_success,
                    mean_latency_s: stats.mean_latency_s,
                    timestamp: Utc::now(),
                });

                let next = self.select(&task);
                if next != active {
                    warmup_error = self.switch(&run_id, active, next, &task, step).await;
                    active = next;
                }
            }
        }

        let result = last.unwrap_or_else(RunResult::empty);
        self.finish(
            &run_id,
            steps,
            &result.strategy_name,
            result.success_score,
            early_stop,
        );
        result
    }

    fn select(&mut self, task: &Task) -> usize {
        self.strategies
            .select(self.policy.as_mut(), task, &self.config, &self.metrics)
    }

    /// Warm up the strategy at `index`. A failure is returned for the next step to report.
    async fn activate(
        &mut self,
        run_id: &str,
        index: usize,
        task: &Task,
        step: u32,
    ) -> Option<StrategyError> {
        let strategy = self.strategies.get_mut(index);
        let name = strategy.name().to_string();
        info!(strategy = %name, step, "Strategy activated");
        self.event_bus.publish(DomainEvent::StrategyActivated {
            run_id: run_id.to_string(),
            strategy: name.clone(),
            step,
            timestamp: Utc::now(),
        });

        match strategy.warmup(task, &self.config).await {
            Ok(()) => None,
            Err(e) => {
                warn!(strategy = %name, error = %e, "Warm-up failed");
                Some(e)
            }
        }
    }

    /// Hand state from `from` to `to`, warm `to` up, and restart the cooldown.
    async fn switch(
        &mut self,
        run_id: &str,
        from: usize,
        to: usize,
        task: &Task,
        step: u32,
    ) -> Option<StrategyError> {
        let state = self.strategies.get(from).handoff_state();
        self.strategies.get_mut(to).accept_handoff(&state);

        let from_name = self.strategies.get(from).name().to_string();
        let to_name = self.strategies.get(to).name().to_string();
        info!(step, from = %from_name, to = %to_name, "Switching strategy");
        self.event_bus.publish(DomainEvent::StrategySwitched {
            run_id: run_id.to_string(),
            step,
            from: from_name,
            to: to_name,
            timestamp: Utc::now(),
        });

        let warmup_error = self.activate(run_id, to, task, step + 1).await;
        self.evaluator.switched();
        warmup_error
    }

    fn finish(&self, run_id: &str, steps: u32, strategy: &str, score: f64, early_stop: bool) {
        info!(steps, strategy = %strategy, score, early_stop, "Run finished");
        self.event_bus.publish(DomainEvent::RunFinished {
            run_id: run_id.to_string(),
            steps,
            strategy: strategy.to_string(),
            success_score: score,
            early_stop,
            timestamp: Utc::now(),
        });
    }
}

/// Run a single task with a fresh agent built from `config`.
pub async fn run(
    task: &str,
    language_hint: &str,
    config: &AppConfig,
    max_steps: u32,
) -> Result<RunResult, ConfigError> {
    let mut agent = Agent::from_config(config)?;
    Ok(agent.run(task, language_hint, max_steps).await)
}
