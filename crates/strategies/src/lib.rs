//! Built-in strategy implementations for Switchback.
//!
//! Strategies are the interchangeable ways of attempting a task:
//! produce a fixed plan, look up reference code, or ask a completion
//! model. Each one maps to a [`StrategyKind`] and is built once per agent
//! by [`Collaborators::build_all`].

pub mod planner;
pub mod reasoner;
pub mod registry;
pub mod retriever;

pub use planner::RuleBasedPlanner;
pub use reasoner::OpenAIReasoner;
pub use registry::Collaborators;
pub use retriever::GithubRetriever;

use switchback_core::StrategyKind;

/// Default display name of the strategy built for `kind`.
pub fn strategy_name(kind: StrategyKind) -> &'static str {
    match kind {
        StrategyKind::Planner => planner::NAME,
        StrategyKind::Retriever => retriever::NAME,
        StrategyKind::Reasoner => reasoner::NAME,
    }
}
