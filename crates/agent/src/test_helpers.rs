//! Shared test helpers for agent tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use switchback_core::{
    AgentConfig, HandoffState, RunResult, StateValue, Strategy, StrategyError, StrategyKind, Task,
};

/// Ordered record of lifecycle calls across strategies, e.g. `"A.warmup"`.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A strategy that returns scripted scores and records every lifecycle call.
///
/// Scores are consumed in order; the last one repeats.
pub struct ScriptedStrategy {
    name: String,
    kind: StrategyKind,
    scores: Vec<f64>,
    latency_s: f64,
    supported: bool,
    warmup_error: Option<String>,
    runs: usize,
    received: HandoffState,
    log: CallLog,
}

impl ScriptedStrategy {
    pub fn new(name: &str, kind: StrategyKind, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            kind,
            scores: vec![0.5],
            latency_s: 0.0,
            supported: true,
            warmup_error: None,
            runs: 0,
            received: HandoffState::new(),
            log: log.clone(),
        }
    }

    pub fn scores(mut self, scores: &[f64]) -> Self {
        self.scores = scores.to_vec();
        self
    }

    pub fn latency(mut self, latency_s: f64) -> Self {
        self.latency_s = latency_s;
        self
    }

    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    pub fn failing_warmup(mut self, reason: &str) -> Self {
        self.warmup_error = Some(reason.into());
        self
    }

    fn record(&self, call: &str) {
        self.log.lock().unwrap().push(format!("{}.{call}", self.name));
    }
}

#[async_trait]
impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn supports(&self, _task: &Task, _config: &AgentConfig) -> bool {
        self.supported
    }

    async fn warmup(&mut self, _task: &Task, _config: &AgentConfig) -> Result<(), StrategyError> {
        self.record("warmup");
        match &self.warmup_error {
            Some(reason) => Err(StrategyError::WarmupFailed {
                strategy: self.name.clone(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn run(&mut self, _task: &Task, _config: &AgentConfig) -> RunResult {
        self.record("run");
        let score = self
            .scores
            .get(self.runs)
            .or(self.scores.last())
            .copied()
            .unwrap_or(0.5);
        self.runs += 1;
        let mut result = RunResult::new(
            format!("{} output {}", self.name, self.runs),
            score,
            self.latency_s,
            &self.name,
        );
        if let Some(from) = self.received.get("from").and_then(StateValue::as_str) {
            result = result.with_meta("handoff_from", from);
        }
        result
    }

    fn handoff_state(&self) -> HandoffState {
        self.record("handoff_state");
        let mut state = HandoffState::new();
        state.insert("from".into(), self.name.as_str().into());
        state.insert("runs".into(), (self.runs as i64).into());
        state
    }

    fn accept_handoff(&mut self, state: &HandoffState) {
        self.record("accept_handoff");
        self.received = state.clone();
    }
}
