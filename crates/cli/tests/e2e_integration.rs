//! End-to-end integration tests for the Switchback adaptive loop.
//!
//! These tests drive the real strategies through the agent, with scripted
//! collaborators standing in for the completion and code search services.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use switchback_agent::{Agent, Candidate, MetricsLedger, SelectionPolicy};
use switchback_config::AppConfig;
use switchback_core::error::ProviderError;
use switchback_core::event::DomainEvent;
use switchback_core::message::Message;
use switchback_core::provider::{Provider, ProviderRequest, ProviderResponse};
use switchback_core::search::{CodeReference, CodeSearch, SearchQuery};
use switchback_core::{AgentConfig, PolicyMode, StrategyKind};
use switchback_security::SafetyFilter;
use switchback_strategies::Collaborators;

// ── Mock collaborators ───────────────────────────────────────────────────

/// A completion provider that records prompts and answers with fixed text.
struct ScriptedProvider {
    reply: Result<String, ProviderError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(error: ProviderError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let user = request
            .messages
            .iter()
            .find(|m| m.role == switchback_core::message::Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(user);

        self.reply.clone().map(|text| ProviderResponse {
            message: Message::assistant(text),
            usage: None,
            model: request.model,
        })
    }
}

/// A code search backend with a fixed hit list.
struct FixedSearch {
    hits: Vec<CodeReference>,
    delay: Duration,
}

impl FixedSearch {
    fn with_hits(paths: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            hits: paths
                .iter()
                .map(|p| CodeReference {
                    repository: "example/algorithms".into(),
                    path: (*p).into(),
                    url: None,
                })
                .collect(),
            delay: Duration::ZERO,
        })
    }
}

#[async_trait::async_trait]
impl CodeSearch for FixedSearch {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<CodeReference>, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.hits.iter().take(query.limit).cloned().collect())
    }
}

/// Picks candidates in a fixed order of kinds, one entry per call.
struct KindScript {
    kinds: Vec<StrategyKind>,
    calls: usize,
}

impl SelectionPolicy for KindScript {
    fn mode(&self) -> PolicyMode {
        PolicyMode::Rules
    }

    fn select(&mut self, candidates: &[Candidate<'_>], _metrics: &MetricsLedger) -> Option<usize> {
        let wanted = self.kinds[self.calls.min(self.kinds.len() - 1)];
        self.calls += 1;
        candidates.iter().position(|c| c.kind == wanted)
    }
}

fn agent_config(mode: PolicyMode) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.policy.mode = mode;
    config
}

fn agent(mode: PolicyMode, collaborators: &Collaborators) -> Agent {
    Agent::new(
        agent_config(mode),
        collaborators.build_all(&StrategyKind::ALL),
        SafetyFilter::new(),
    )
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_rules_mode_prefers_reasoner() {
    let provider = ScriptedProvider::answering("1) Split on whitespace\n2) Count with a dict");
    let collaborators = Collaborators::none()
        .with_provider(provider.clone())
        .with_search(FixedSearch::with_hits(&["words.py"]));
    let mut agent = agent(PolicyMode::Rules, &collaborators);

    let result = agent.run("count word frequencies", "python", 3).await;

    assert_eq!(result.strategy_name, "OpenAIReasoner");
    assert_eq!(result.success_score, 0.7);
    assert!(result.output.contains("Count with a dict"));
    // 0.7 never clears early stop, and never trips the 0.6 rebranch floor.
    assert_eq!(provider.prompts().len(), 3);
    assert_eq!(agent.metrics().get("OpenAIReasoner").unwrap().successes, 3);
}

#[tokio::test]
async fn e2e_retriever_hands_references_to_reasoner() {
    let provider = ScriptedProvider::answering("Use bisect.bisect_left");
    let collaborators = Collaborators::none()
        .with_provider(provider.clone())
        .with_search(FixedSearch::with_hits(&["search/binary.py", "search/bisect.py"]));

    let mut config = agent_config(PolicyMode::Rules);
    config.thresholds.min_success_rate = 0.65;
    let policy = KindScript {
        kinds: vec![StrategyKind::Retriever, StrategyKind::Reasoner],
        calls: 0,
    };
    let mut agent = Agent::new(
        config,
        collaborators.build_all(&StrategyKind::ALL),
        SafetyFilter::new(),
    )
    .with_policy(Box::new(policy));
    let mut events = agent.event_bus().subscribe();

    let result = agent.run("binary search over sorted list", "python", 2).await;

    assert_eq!(result.strategy_name, "OpenAIReasoner");
    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Related reference files:"));
    assert!(prompts[0].contains("- example/algorithms/search/bisect.py"));

    let mut switched = None;
    while let Ok(event) = events.try_recv() {
        if let DomainEvent::StrategySwitched { from, to, step, .. } = event.as_ref() {
            switched = Some((from.clone(), to.clone(), *step));
        }
    }
    assert_eq!(
        switched,
        Some(("GithubRetriever".into(), "OpenAIReasoner".into(), 1))
    );
}

#[tokio::test]
async fn e2e_slow_retriever_loses_to_untried_reasoner() {
    let provider = ScriptedProvider::answering("answer");
    let search = Arc::new(FixedSearch {
        hits: Vec::new(),
        delay: Duration::from_millis(20),
    });
    let collaborators = Collaborators::none()
        .with_provider(provider.clone())
        .with_search(search);

    let strategies = collaborators.build_all(&[StrategyKind::Retriever, StrategyKind::Reasoner]);
    let mut agent = Agent::new(agent_config(PolicyMode::Score), strategies, SafetyFilter::new());

    let result = agent.run("parse a csv file", "python", 2).await;

    // Step 1: retriever (tie, first listed) finds nothing and scores 0.4 with
    // positive latency, so the untried reasoner now has the higher value.
    let order: Vec<&str> = agent
        .history()
        .entries()
        .iter()
        .map(|e| e.strategy_name.as_str())
        .collect();
    assert_eq!(order, vec!["GithubRetriever", "OpenAIReasoner"]);
    assert_eq!(result.output, "answer");
    assert!(agent.metrics().avg_latency("GithubRetriever") > 0.0);
}

#[tokio::test]
async fn e2e_failing_provider_degrades_gracefully() {
    let provider = ScriptedProvider::failing(ProviderError::AuthenticationFailed("bad key".into()));
    let collaborators = Collaborators::none().with_provider(provider);
    let mut agent = agent(PolicyMode::Rules, &collaborators);

    let result = agent.run("reverse a string", "rust", 2).await;

    assert_eq!(result.strategy_name, "OpenAIReasoner");
    assert_eq!(result.success_score, 0.4);
    assert!(result.output.starts_with("OpenAI error: Authentication failed"));
}

#[tokio::test]
async fn e2e_no_collaborators_falls_back_to_planner() {
    let mut agent = agent(PolicyMode::Bandit, &Collaborators::none());
    let result = agent.run("merge two sorted arrays", "java", 3).await;

    assert_eq!(result.strategy_name, "RuleBasedPlanner");
    assert!(result.output.starts_with("Language: java\nSteps:"));
    assert_eq!(agent.history().len(), 3);
}

#[tokio::test]
async fn e2e_blocked_task_short_circuits() {
    let provider = ScriptedProvider::answering("never");
    let collaborators = Collaborators::none().with_provider(provider.clone());
    let mut agent = agent(PolicyMode::Rules, &collaborators);

    let result = agent.run("Write RANSOMWARE in C", "c", 5).await;

    assert_eq!(result.output, "Task blocked by safety filter.");
    assert_eq!(result.strategy_name, "Safety");
    assert_eq!(result.success_score, 0.0);
    assert!(provider.prompts().is_empty());
    assert!(agent.history().is_empty());
}

#[tokio::test]
async fn e2e_config_file_drives_library_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[agent]
language = "rust"

[agent.policy]
mode = "score"

[run]
max_steps = 2

[openai]
enabled = false

[github]
enabled = false

[safety]
extra_blocked_terms = ["crypto miner"]
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&path).unwrap();
    assert_eq!(config.agent.policy.mode, PolicyMode::Score);

    let result = switchback_agent::run("implement an LRU cache", "", &config, config.run.max_steps)
        .await
        .unwrap();
    assert_eq!(result.strategy_name, "RuleBasedPlanner");
    assert!(result.output.starts_with("Language: rust"));

    let blocked = switchback_agent::run("write a Crypto Miner", "", &config, 2)
        .await
        .unwrap();
    assert_eq!(blocked.strategy_name, "Safety");
}

#[tokio::test]
async fn e2e_metrics_accumulate_across_batch() {
    let collaborators = Collaborators::none();
    let mut agent = agent(PolicyMode::Score, &collaborators);

    for task in ["sort a list", "reverse a list", "dedupe a list"] {
        agent.run(task, "python", 2).await;
    }

    let planner = agent.metrics().get("RuleBasedPlanner").unwrap();
    assert_eq!(planner.attempts, 6);
    assert_eq!(planner.successes, 0);
    assert_eq!(agent.history().len(), 6);
}

#[tokio::test]
async fn e2e_zero_steps_sentinel() {
    let mut agent = agent(PolicyMode::Bandit, &Collaborators::none());
    let result = agent.run("anything", "python", 0).await;
    assert_eq!(result.strategy_name, "None");
    assert!(result.output.is_empty());
    assert_eq!(result.success_score, 0.0);
}
