//! `switchback run`: one task through the adaptive loop.

use switchback_agent::Agent;

use super::{RunOptions, print_trace, resolve};

pub async fn run(
    task: &str,
    options: &RunOptions,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, max_steps) = resolve(options)?;
    let mut agent = Agent::from_config(&config)?;
    let mut events = agent.event_bus().subscribe();

    let language = options.language.as_deref().unwrap_or_default();
    let result = agent.run(task, language, max_steps).await;

    if verbose {
        print_trace(&mut events);
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.output);
        eprintln!(
            "\n[{}] score={:.2} latency={:.3}s",
            result.strategy_name, result.success_score, result.latency_s
        );
    }

    Ok(())
}
