//! The `eduverse-grade show` command.

use std::path::PathBuf;

use anyhow::Result;

use eduverse_core::error::GradeError;
use eduverse_core::model::Level;
use eduverse_core::parser::load_scenarios;
use eduverse_core::resolver::{resolve_display, resolve_scenario_display};
use eduverse_store::load_config_from;

pub fn execute(
    week: u32,
    cycle: Option<usize>,
    level: String,
    scenarios_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let level: Level = level.parse().map_err(anyhow::Error::msg)?;
    let scenarios_path = match scenarios_path {
        Some(path) => path,
        None => load_config_from(config_path.as_deref())?.scenarios_path,
    };

    let scenarios = load_scenarios(&scenarios_path)?;
    let scenario = scenarios
        .iter()
        .find(|s| s.week == week)
        .ok_or(GradeError::ScenarioNotFound { week })?;

    let json = match cycle {
        Some(index) => {
            let found = scenario.cycle(index).ok_or(GradeError::CycleOutOfRange {
                week,
                cycle: index,
                available: scenario.cycles.len(),
            })?;
            serde_json::to_string_pretty(&resolve_display(found, index, level))?
        }
        None => serde_json::to_string_pretty(&resolve_scenario_display(scenario, level))?,
    };
    println!("{json}");
    Ok(())
}
