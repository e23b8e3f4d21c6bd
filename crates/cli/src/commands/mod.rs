//! Subcommand implementations and the option handling they share.

pub mod batch;
pub mod config_cmd;
pub mod run;
pub mod strategies;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use switchback_config::AppConfig;
use switchback_core::event::DomainEvent;
use switchback_core::PolicyMode;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;

/// Options shared by `run` and `batch`.
#[derive(Debug, Clone, Default, Args)]
pub struct RunOptions {
    /// Target-language hint (defaults to agent.language)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Selection policy: rules, score or bandit
    #[arg(short, long)]
    pub policy: Option<String>,

    /// Config file to read instead of ~/.switchback/config.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum steps per task (defaults to run.max_steps)
    #[arg(long)]
    pub max_steps: Option<u32>,

    /// Completion model for the reasoner
    #[arg(long)]
    pub openai_model: Option<String>,

    /// Disable the completion-model reasoner
    #[arg(long)]
    pub no_openai: bool,

    /// Disable the code-search retriever
    #[arg(long)]
    pub no_github: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Load config from `path` (or the default location) with env overrides applied.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(config)
}

/// Apply command-line overrides on top of the loaded config and re-validate.
pub fn apply_options(
    mut config: AppConfig,
    options: &RunOptions,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    if let Some(policy) = &options.policy {
        config.agent.policy.mode = policy.parse::<PolicyMode>()?;
    }
    if let Some(model) = &options.openai_model {
        config.openai.model = model.clone();
    }
    if options.no_openai {
        config.openai.enabled = false;
    }
    if options.no_github {
        config.github.enabled = false;
    }
    config.validate()?;
    Ok(config)
}

pub fn resolve(options: &RunOptions) -> Result<(AppConfig, u32), Box<dyn std::error::Error>> {
    let config = apply_options(load_config(options.config.as_deref())?, options)?;
    let max_steps = options.max_steps.unwrap_or(config.run.max_steps);
    Ok((config, max_steps))
}

/// Print the events of a finished run to stderr.
pub fn print_trace(rx: &mut Receiver<Arc<DomainEvent>>) {
    loop {
        let event = match rx.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Lagged(skipped)) => {
                eprintln!("  ... {skipped} events dropped");
                continue;
            }
            Err(_) => break,
        };
        match event.as_ref() {
            DomainEvent::TaskBlocked { matched_term, .. } => {
                eprintln!("  blocked      term={matched_term}");
            }
            DomainEvent::StrategyActivated { strategy, step, .. } => {
                eprintln!("  activate     step={step} strategy={strategy}");
            }
            DomainEvent::StepCompleted {
                step,
                strategy,
                success_score,
                latency_s,
                ..
            } => {
                eprintln!(
                    "  step         step={step} strategy={strategy} score={success_score:.2} latency={latency_s:.3}s"
                );
            }
            DomainEvent::RebranchSignaled {
                step,
                mean_success,
                mean_latency_s,
                ..
            } => {
                eprintln!(
                    "  rebranch     step={step} mean_success={mean_success:.2} mean_latency={mean_latency_s:.3}s"
                );
            }
            DomainEvent::StrategySwitched { step, from, to, .. } => {
                eprintln!("  switch       step={step} {from} -> {to}");
            }
            DomainEvent::RunFinished {
                steps,
                strategy,
                success_score,
                early_stop,
                ..
            } => {
                eprintln!(
                    "  finished     steps={steps} strategy={strategy} score={success_score:.2} early_stop={early_stop}"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_override_config() {
        let options = RunOptions {
            policy: Some("rules".into()),
            openai_model: Some("gpt-4.1-mini".into()),
            no_openai: true,
            no_github: true,
            ..RunOptions::default()
        };
        let config = apply_options(AppConfig::default(), &options).unwrap();
        assert_eq!(config.agent.policy.mode, PolicyMode::Rules);
        assert_eq!(config.openai.model, "gpt-4.1-mini");
        assert!(!config.openai.enabled);
        assert!(!config.github.enabled);
    }

    #[test]
    fn bad_policy_is_rejected() {
        let options = RunOptions {
            policy: Some("greedy".into()),
            ..RunOptions::default()
        };
        assert!(apply_options(AppConfig::default(), &options).is_err());
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions {
            config: Some(dir.path().join("absent.toml")),
            max_steps: Some(3),
            ..RunOptions::default()
        };
        let (config, max_steps) = resolve(&options).unwrap();
        assert_eq!(max_steps, 3);
        assert_eq!(config.agent.language, "python");
    }
}
