//! Maps [`StrategyKind`] values to concrete strategies.
//!
//! The collaborators (completion provider, code search) are resolved once
//! from configuration and shared by the strategies that need them. A missing
//! collaborator does not drop its strategy from the set; the strategy just
//! reports itself as unsupported.

use std::sync::Arc;
use switchback_config::AppConfig;
use switchback_core::{CodeSearch, Provider, Strategy, StrategyKind};
use switchback_providers::{GithubCodeSearch, OpenAiCompatProvider};
use tracing::debug;

use crate::{GithubRetriever, OpenAIReasoner, RuleBasedPlanner};

/// External services available to strategies.
#[derive(Clone)]
pub struct Collaborators {
    pub provider: Option<Arc<dyn Provider>>,
    pub search: Option<Arc<dyn CodeSearch>>,
    pub model: String,
    pub per_page: usize,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::none()
    }
}

impl Collaborators {
    /// No external services: only the planner will be supported.
    pub fn none() -> Self {
        Self {
            provider: None,
            search: None,
            model: "gpt-4o-mini".into(),
            per_page: 3,
        }
    }

    /// Resolve collaborators from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let provider = OpenAiCompatProvider::from_config(&config.openai)
            .map(|p| Arc::new(p) as Arc<dyn Provider>);
        let search = GithubCodeSearch::from_config(&config.github)
            .map(|s| Arc::new(s) as Arc<dyn CodeSearch>);

        debug!(
            provider = provider.is_some(),
            search = search.is_some(),
            "Resolved strategy collaborators"
        );

        Self {
            provider,
            search,
            model: config.openai.model.clone(),
            per_page: config.github.per_page,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_search(mut self, search: Arc<dyn CodeSearch>) -> Self {
        self.search = Some(search);
        self
    }

    /// Build the strategy for one kind.
    pub fn build(&self, kind: StrategyKind) -> Box<dyn Strategy> {
        match kind {
            StrategyKind::Planner => Box::new(RuleBasedPlanner::new()),
            StrategyKind::Retriever => {
                Box::new(GithubRetriever::new(self.search.clone(), self.per_page))
            }
            StrategyKind::Reasoner => {
                Box::new(OpenAIReasoner::new(self.provider.clone(), self.model.clone()))
            }
        }
    }

    /// Build strategies for `kinds`, in order, skipping duplicates.
    pub fn build_all(&self, kinds: &[StrategyKind]) -> Vec<Box<dyn Strategy>> {
        let mut seen = Vec::with_capacity(kinds.len());
        kinds
            .iter()
            .filter(|k| {
                if seen.contains(*k) {
                    false
                } else {
                    seen.push(**k);
                    true
                }
            })
            .map(|k| self.build(*k))
            .collect()
    }
}
