// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Run the agent in the small loop and summarize what it learned.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use enactor_cortex::application::DecisionCycleController;
use enactor_cortex::domain::{AgentConfigManifest, CortexEvent, PatternRegistry};
use enactor_cortex::infrastructure::{EventBus, SessionEventReceiver};

use crate::environment::SmallLoop;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Number of ticks (atomic actions) to run
    #[arg(short, long, default_value_t = 200)]
    pub ticks: u64,

    /// Seed for the tie-break draw (overrides configuration)
    #[arg(long, env = "ENACTOR_SEED")]
    pub seed: Option<u64>,

    /// Print every tick and every learning event
    #[arg(long)]
    pub trace: bool,

    /// Number of learned patterns to list in the summary
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

/// Totals collected over a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub cycles: u64,
    pub satisfaction: i64,
    pub failed_cycles: u64,
}

pub async fn execute(args: RunArgs, config_override: Option<PathBuf>) -> Result<()> {
    let mut manifest = AgentConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;
    if let Some(seed) = args.seed {
        manifest.spec.selection.seed = Some(seed);
    }
    manifest
        .validate()
        .context("Configuration validation failed")?;

    let bus = EventBus::with_default_capacity();
    let mut controller = DecisionCycleController::from_manifest(&manifest, Some(bus.clone()))
        .context("Failed to build the decision core")?;
    let mut events = bus.subscribe_session(controller.session_id());
    let mut environment = SmallLoop::new(manifest.spec.repertoire.clone());

    info!(
        agent = %manifest.metadata.name,
        ticks = args.ticks,
        "Starting run in the small loop"
    );
    println!(
        "{} {} ({} ticks)",
        "Running".bold(),
        manifest.metadata.name.cyan(),
        args.ticks
    );

    let mut summary = RunSummary::default();
    let mut decision = controller.step(None)?;
    for tick in 1..=args.ticks {
        let outcome = environment.enact(&decision.action);
        summary.ticks += 1;
        summary.satisfaction += outcome.satisfaction;

        if args.trace {
            let line = format!(
                "{:>5}  {}{}  {:>4}",
                tick, outcome.action, outcome.result, outcome.satisfaction
            );
            if outcome.satisfaction >= 0 {
                println!("{}", line.green());
            } else {
                println!("{}", line.red());
            }
        }

        decision = controller.step(Some(&outcome))?;
        if let Some(report) = &decision.completed_cycle {
            summary.cycles += 1;
            if !report.succeeded() {
                summary.failed_cycles += 1;
            }
        }

        drain_events(&mut events, controller.registry(), args.trace);
    }

    print_summary(&summary, controller.registry(), args.top);
    if args.trace {
        println!();
        print!("{}", environment);
    }

    Ok(())
}

fn drain_events(events: &mut SessionEventReceiver, registry: &PatternRegistry, print: bool) {
    while let Ok(event) = events.try_recv() {
        if !print {
            continue;
        }
        if let Some(line) = event_line(&event, registry) {
            println!("       {}", line);
        }
    }
}

/// Trace line for the events worth showing during a run.
pub fn event_line(event: &CortexEvent, registry: &PatternRegistry) -> Option<String> {
    match event {
        CortexEvent::CompositeLearned { label, value, .. } => {
            Some(format!("{} {} ({})", "learned".cyan(), label, value))
        }
        CortexEvent::FailureSynthesized { failure, value, .. } => Some(format!(
            "{} {} ({})",
            "failed".yellow(),
            registry.label(*failure),
            value
        )),
        CortexEvent::IntentionSelected {
            label, activation, ..
        } => Some(format!("{} {} [{}]", "intend".bold(), label, activation)),
        CortexEvent::DecisionCycleCompleted {
            cycle,
            enacted,
            succeeded,
            ..
        } => {
            let status = if *succeeded { "ok".green() } else { "!".red() };
            Some(format!("{} {} {} {}", "cycle".dimmed(), cycle, enacted, status))
        }
        _ => None,
    }
}

/// Composites ranked by weight, heaviest first.
pub fn top_patterns(registry: &PatternRegistry, limit: usize) -> Vec<(String, i64, i64)> {
    let mut learned: Vec<_> = registry
        .iter()
        .filter(|(pattern, _)| pattern.is_composite())
        .map(|(pattern, schema)| (pattern.label.clone(), schema.weight, pattern.value))
        .collect();
    learned.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    learned.truncate(limit);
    learned
}

fn print_summary(summary: &RunSummary, registry: &PatternRegistry, top: usize) {
    println!();
    println!("{}", "Run summary:".bold());
    println!("  Ticks: {}", summary.ticks);
    println!(
        "  Decision cycles: {} ({} failed)",
        summary.cycles, summary.failed_cycles
    );
    println!("  Cumulative satisfaction: {}", summary.satisfaction);
    println!(
        "  Patterns: {} primitive, {} composite",
        registry.primitive_count(),
        registry.composite_count()
    );
    println!();

    let learned = top_patterns(registry, top);
    if learned.is_empty() {
        println!("{}", "No composite patterns learned".dimmed());
        return;
    }

    println!("{}", "Strongest schemas:".bold());
    for (label, weight, value) in learned {
        println!("  {:>4}  {}  ({})", weight, label, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enactor_cortex::domain::{PatternId, SessionId};

    #[test]
    fn test_top_patterns_ranked_by_weight() {
        let mut registry = PatternRegistry::default();
        let a = registry.intern_primitive("a", "t", 1).unwrap();
        let b = registry.intern_primitive("b", "t", 2).unwrap();
        let ab = registry.intern_composite(a, b).unwrap();
        let ba = registry.intern_composite(b, a).unwrap();
        registry.schema_mut(ab).unwrap().reinforce(3);
        registry.schema_mut(ba).unwrap().reinforce(5);

        let top = top_patterns(&registry, 10);
        assert_eq!(
            top,
            vec![("(btat)".to_string(), 5, 3), ("(atbt)".to_string(), 3, 3)]
        );
        assert_eq!(top_patterns(&registry, 1).len(), 1);
    }

    #[test]
    fn test_failure_event_line_shows_label() {
        let mut registry = PatternRegistry::default();
        let a = registry.intern_primitive("a", "t", 1).unwrap();
        let b = registry.intern_primitive("b", "t", 2).unwrap();
        let ab = registry.intern_composite(a, b).unwrap();
        let failure = registry.intern_failure(ab, -4).unwrap();
        let event = CortexEvent::FailureSynthesized {
            session_id: SessionId::new(),
            intended: ab,
            failure,
            value: -4,
            timestamp: chrono::Utc::now(),
        };

        let line = event_line(&event, &registry).unwrap();
        assert!(line.contains("!(atbt) (-4)"));
        assert!(!line.contains(&failure.to_string()));
    }

    #[test]
    fn test_quiet_events_have_no_line() {
        let registry = PatternRegistry::default();
        let event = CortexEvent::PatternReinforced {
            session_id: SessionId::new(),
            pattern_id: PatternId(0),
            old_weight: 1,
            new_weight: 2,
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(event_line(&event, &registry), None);
    }
}
