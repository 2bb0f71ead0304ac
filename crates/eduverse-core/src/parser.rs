//! Scenario file parser.
//!
//! Loads week documents from JSON files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::model::Scenario;

/// Parse a single JSON file holding one week document or an array of them.
pub fn parse_scenario_file(path: &Path) -> Result<Vec<Scenario>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file: {}", path.display()))?;

    parse_scenarios_str(&content, path)
}

/// Parse a JSON string into scenarios (useful for testing).
///
/// Entries that are not objects, or whose `week` is missing or not a
/// non-negative integer, are skipped with a warning.
pub fn parse_scenarios_str(content: &str, source_path: &Path) -> Result<Vec<Scenario>> {
    let parsed: Value = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;

    let entries = match parsed {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => anyhow::bail!(
            "{}: top level must be an array of week documents",
            source_path.display()
        ),
    };

    let mut scenarios = Vec::new();
    for (position, mut entry) in entries.into_iter().enumerate() {
        let Some(object) = entry.as_object_mut() else {
            tracing::warn!(
                "{}: entry {} is not an object, skipping",
                source_path.display(),
                position + 1
            );
            continue;
        };

        let Some(week) = object.get("week").and_then(week_number) else {
            tracing::warn!(
                "{}: entry {} has no usable week number, skipping",
                source_path.display(),
                position + 1
            );
            continue;
        };
        object.insert("week".into(), Value::from(week));

        let scenario: Scenario = serde_json::from_value(entry).with_context(|| {
            format!("{}: malformed document for week {week}", source_path.display())
        })?;
        scenarios.push(scenario);
    }

    Ok(scenarios)
}

fn week_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Recursively load all `.json` scenario files from a directory.
pub fn load_scenario_directory(dir: &Path) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            scenarios.extend(load_scenario_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            match parse_scenario_file(&path) {
                Ok(found) => scenarios.extend(found),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(scenarios)
}

/// Load scenarios from either a file or a directory.
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>> {
    if path.is_dir() {
        load_scenario_directory(path)
    } else {
        parse_scenario_file(path)
    }
}

/// A warning from scenario validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub week: u32,
    /// The cycle index, if the warning is about one cycle.
    pub cycle: Option<usize>,
    pub message: String,
}

/// Validate scenarios for common authoring mistakes.
pub fn validate_scenarios(scenarios: &[Scenario]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_weeks = HashSet::new();
    for scenario in scenarios {
        if !seen_weeks.insert(scenario.week) {
            warnings.push(ValidationWarning {
                week: scenario.week,
                cycle: None,
                message: format!("duplicate week: {}", scenario.week),
            });
        }
    }

    for scenario in scenarios {
        if scenario.cycles.is_empty() {
            warnings.push(ValidationWarning {
                week: scenario.week,
                cycle: None,
                message: "scenario has no cycles".into(),
            });
        }

        for (index, cycle) in scenario.cycles.iter().enumerate() {
            let mut warn = |message: String| {
                warnings.push(ValidationWarning {
                    week: scenario.week,
                    cycle: Some(index),
                    message,
                })
            };

            for (name, field) in [
                ("starterCode", &cycle.starter_code),
                ("task", &cycle.task),
                ("briefing", &cycle.briefing),
                ("testCode", &cycle.test_code),
            ] {
                if field.has_advanced() && !field.has_base() {
                    warn(format!(
                        "{name}Advanced is set but {name} is not; beginners get nothing"
                    ));
                }
            }

            if cycle.test_code.is_absent() {
                warn("no testCode, cycle is not auto-graded".into());
                if cycle.expected_output.is_some() {
                    warn("expectedPrintOutput is ignored without testCode".into());
                }
            }
        }
    }

    warnings
}
