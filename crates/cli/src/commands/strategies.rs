//! `switchback strategies`: what is configured and what can run right now.

use std::path::Path;

use switchback_agent::StrategySet;
use switchback_core::Task;
use switchback_strategies::Collaborators;

use super::load_config;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let set =
        StrategySet::new(Collaborators::from_config(&config).build_all(&config.agent.strategies));
    let probe = Task::new("", config.agent.language.clone());

    println!("Policy: {}", config.agent.policy.mode);
    println!();
    println!("{:<20} {:<10} Supported", "Strategy", "Kind");
    for (i, strategy) in set.iter().enumerate() {
        let supported = if strategy.supports(&probe, &config.agent) { "yes" } else { "no" };
        let note = if i == set.fallback() { " (fallback)" } else { "" };
        println!(
            "{:<20} {:<10} {supported}{note}",
            strategy.name(),
            strategy.kind().as_str()
        );
    }
    Ok(())
}
