//! Domain event system: observable milestones of a run.
//!
//! The control loop publishes an event at every state transition worth
//! reporting. Subscribers (the CLI's step trace, tests) react without the
//! loop knowing about them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The safety gate rejected a task
    TaskBlocked {
        run_id: String,
        matched_term: String,
        timestamp: DateTime<Utc>,
    },

    /// A strategy became active (first selection or switch-in)
    StrategyActivated {
        run_id: String,
        strategy: String,
        step: u32,
        timestamp: DateTime<Utc>,
    },

    /// One step finished
    StepCompleted {
        run_id: String,
        step: u32,
        strategy: String,
        success_score: f64,
        latency_s: f64,
        timestamp: DateTime<Utc>,
    },

    /// The trailing window fell below thresholds
    RebranchSignaled {
        run_id: String,
        step: u32,
        mean_success: f64,
        mean_latency_s: f64,
        timestamp: DateTime<Utc>,
    },

    /// The active strategy changed
    StrategySwitched {
        run_id: String,
        step: u32,
        from: String,
        to: String,
        timestamp: DateTime<Utc>,
    },

    /// The run terminated
    RunFinished {
        run_id: String,
        steps: u32,
        strategy: String,
        success_score: f64,
        early_stop: bool,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::StrategySwitched {
            run_id: "r1".into(),
            step: 2,
            from: "RuleBasedPlanner".into(),
            to: "GithubRetriever".into(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::StrategySwitched { from, to, step, .. } => {
                assert_eq!(from, "RuleBasedPlanner");
                assert_eq!(to, "GithubRetriever");
                assert_eq!(*step, 2);
            }
            _ => panic!("Expected StrategySwitched event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::TaskBlocked {
            run_id: "r1".into(),
            matched_term: "botnet".into(),
            timestamp: Utc::now(),
        });
    }
}
