//! `switchback batch`: many tasks through one agent, so metrics carry over.

use std::path::Path;

use switchback_agent::{Agent, MetricsLedger};
use tracing::info;

use super::{RunOptions, print_trace, resolve};

pub async fn run(
    file: &Path,
    options: &RunOptions,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let tasks = parse_tasks(&content);
    if tasks.is_empty() {
        return Err(format!("No tasks found in {}", file.display()).into());
    }

    let (config, max_steps) = resolve(options)?;
    let mut agent = Agent::from_config(&config)?;
    let mut events = agent.event_bus().subscribe();
    let language = options.language.as_deref().unwrap_or_default();
    info!(tasks = tasks.len(), max_steps, file = %file.display(), "Batch started");

    for (i, task) in tasks.iter().enumerate() {
        let result = agent.run(task, language, max_steps).await;
        if verbose {
            print_trace(&mut events);
        }

        if options.json {
            println!("{}", serde_json::to_string(&result)?);
        } else {
            println!("=== Task {}: {task}", i + 1);
            println!("{}", result.output);
            println!(
                "--- [{}] score={:.2} latency={:.3}s\n",
                result.strategy_name, result.success_score, result.latency_s
            );
        }
    }

    if !options.json {
        print!("{}", metrics_table(agent.metrics()));
    }

    Ok(())
}

/// One task per non-empty line, trimmed.
fn parse_tasks(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

fn metrics_table(metrics: &MetricsLedger) -> String {
    let mut out = format!(
        "{:<20} {:>8} {:>9} {:>8} {:>12}\n",
        "Strategy", "Attempts", "Successes", "Rate", "Avg latency"
    );
    for (name, m) in metrics.iter() {
        out.push_str(&format!(
            "{:<20} {:>8} {:>9} {:>8.2} {:>11.3}s\n",
            name,
            m.attempts,
            m.successes,
            m.success_rate(),
            m.avg_latency()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchback_core::RunResult;

    #[test]
    fn blank_lines_are_skipped() {
        let tasks = parse_tasks("sort a list\n\n   \n  reverse a string  \n");
        assert_eq!(tasks, vec!["sort a list", "reverse a string"]);
    }

    #[test]
    fn table_lists_each_strategy() {
        let mut ledger = MetricsLedger::new();
        ledger.update(&RunResult::new("a", 0.7, 0.5, "OpenAIReasoner"));
        ledger.update(&RunResult::new("b", 0.55, 0.0, "RuleBasedPlanner"));

        let table = metrics_table(&ledger);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Strategy"));
        assert!(lines[1].starts_with("OpenAIReasoner"));
        assert!(lines[1].contains("1.00"));
        assert!(lines[2].starts_with("RuleBasedPlanner"));
    }
}
