//! The `eduverse-grade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use eduverse_core::parser::{load_scenarios, validate_scenarios};

pub fn execute(scenarios_path: PathBuf) -> Result<()> {
    let scenarios = load_scenarios(&scenarios_path)?;

    let cycles: usize = scenarios.iter().map(|s| s.cycles.len()).sum();
    println!("Scenarios: {} ({cycles} cycles)", scenarios.len());
    for scenario in &scenarios {
        let graded = scenario
            .cycles
            .iter()
            .filter(|c| !c.test_code.is_absent())
            .count();
        println!(
            "  week {}: {} cycles, {graded} auto-graded",
            scenario.week,
            scenario.cycles.len()
        );
    }

    let warnings = validate_scenarios(&scenarios);
    for w in &warnings {
        let prefix = match w.cycle {
            Some(cycle) => format!("  [week {} cycle {cycle}]", w.week),
            None => format!("  [week {}]", w.week),
        };
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All scenarios valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
