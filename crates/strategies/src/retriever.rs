//! Code-search retriever: finds a few reference files for the task.
//!
//! Only repository paths are reported. Search failures are folded into a
//! low-score result rather than returned as errors.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use switchback_core::{
    AgentConfig, CodeReference, CodeSearch, HandoffState, RunResult, SearchQuery, Strategy,
    StrategyKind, Task,
};
use tracing::{debug, warn};

pub const NAME: &str = "GithubRetriever";

/// Score when at least one reference came back.
pub const FOUND_SCORE: f64 = 0.6;

/// Score when nothing was found or the search failed.
pub const MISS_SCORE: f64 = 0.4;

const HEADER: &str = "GitHub examples (paths only):";

pub struct GithubRetriever {
    search: Option<Arc<dyn CodeSearch>>,
    per_page: usize,
    last_query: Option<String>,
    last_references: Vec<CodeReference>,
}

impl GithubRetriever {
    pub fn new(search: Option<Arc<dyn CodeSearch>>, per_page: usize) -> Self {
        Self {
            search,
            per_page: per_page.max(1),
            last_query: None,
            last_references: Vec::new(),
        }
    }

    fn reference_lines(references: &[CodeReference]) -> String {
        references
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Strategy for GithubRetriever {
    fn name(&self) -> &str {
        NAME
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Retriever
    }

    fn supports(&self, _task: &Task, _config: &AgentConfig) -> bool {
        self.search.is_some()
    }

    async fn run(&mut self, task: &Task, _config: &AgentConfig) -> RunResult {
        let start = Instant::now();
        let Some(search) = &self.search else {
            return RunResult::new(
                format!("{HEADER}\nCode search not configured"),
                MISS_SCORE,
                start.elapsed().as_secs_f64(),
                NAME,
            );
        };

        let query = SearchQuery {
            terms: task.description.trim().to_string(),
            language: task.language.clone(),
            limit: self.per_page,
        };
        self.last_query = Some(query.terms.clone());

        let (output, score) = match search.search(&query).await {
            Ok(references) if !references.is_empty() => {
                debug!(backend = search.name(), count = references.len(), "References found");
                let output = format!("{HEADER}\n{}", Self::reference_lines(&references));
                self.last_references = references;
                (output, FOUND_SCORE)
            }
            Ok(_) => {
                self.last_references.clear();
                (
                    format!("{HEADER}\nNone found or blocked by rate limit"),
                    MISS_SCORE,
                )
            }
            Err(e) => {
                warn!(backend = search.name(), error = %e, "Code search failed");
                self.last_references.clear();
                (format!("{HEADER}\nSearch failed: {e}"), MISS_SCORE)
            }
        };

        RunResult::new(output, score, start.elapsed().as_secs_f64(), NAME)
            .with_meta("reference_count", self.last_references.len())
    }

    fn handoff_state(&self) -> HandoffState {
        let mut state = HandoffState::new();
        state.insert(
            "reference_count".into(),
            (self.last_references.len() as i64).into(),
        );
        if !self.last_references.is_empty() {
            state.insert(
                "references".into(),
                Self::reference_lines(&self.last_references).into(),
            );
        }
        if let Some(query) = &self.last_query {
            state.insert("query".into(), query.as_str().into());
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchback_core::ProviderError;

    struct FixedSearch(Result<Vec<CodeReference>, ProviderError>);

    #[async_trait]
    impl CodeSearch for FixedSearch {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, query: &SearchQuery) -> Result<Vec<CodeReference>, ProviderError> {
            assert_eq!(query.limit, 3);
            self.0.clone()
        }
    }

    fn reference(repo: &str, path: &str) -> CodeReference {
        CodeReference {
            repository: repo.into(),
            path: path.into(),
            url: None,
        }
    }

    fn retriever(result: Result<Vec<CodeReference>, ProviderError>) -> GithubRetriever {
        GithubRetriever::new(Some(Arc::new(FixedSearch(result))), 3)
    }

    #[test]
    fn unsupported_without_backend() {
        let retriever = GithubRetriever::new(None, 3);
        assert!(!retriever.supports(&Task::new("x", "python"), &AgentConfig::default()));
    }

    #[tokio::test]
    async fn hits_score_higher() {
        let mut r = retriever(Ok(vec![
            reference("python/cpython", "Lib/bisect.py"),
            reference("a/b", "search.py"),
        ]));
        let result = r
            .run(&Task::new("binary search", "python"), &AgentConfig::default())
            .await;

        assert_eq!(result.success_score, FOUND_SCORE);
        assert_eq!(
            result.output,
            "GitHub examples (paths only):\n- python/cpython/Lib/bisect.py\n- a/b/search.py"
        );
        assert_eq!(result.metadata["reference_count"], 2);
    }

    #[tokio::test]
    async fn no_hits_scores_low() {
        let mut r = retriever(Ok(vec![]));
        let result = r
            .run(&Task::new("binary search", "python"), &AgentConfig::default())
            .await;
        assert_eq!(result.success_score, MISS_SCORE);
        assert!(result.output.ends_with("None found or blocked by rate limit"));
    }

    #[tokio::test]
    async fn search_error_becomes_low_score_result() {
        let mut r = retriever(Err(ProviderError::RateLimited {
            retry_after_secs: 60,
        }));
        let result = r
            .run(&Task::new("binary search", "python"), &AgentConfig::default())
            .await;
        assert_eq!(result.success_score, MISS_SCORE);
        assert!(result.output.contains("Search failed"));
        assert_eq!(result.strategy_name, "GithubRetriever");
    }

    #[tokio::test]
    async fn handoff_exports_references() {
        let mut r = retriever(Ok(vec![reference("o/r", "x.py")]));
        r.run(&Task::new("  parse csv ", "python"), &AgentConfig::default())
            .await;

        let state = r.handoff_state();
        assert_eq!(state["reference_count"].as_i64(), Some(1));
        assert_eq!(state["references"].as_str(), Some("- o/r/x.py"));
        assert_eq!(state["query"].as_str(), Some("parse csv"));
    }
}
