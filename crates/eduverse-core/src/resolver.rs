//! Level-aware content resolution.
//!
//! A cycle is resolved either for display, yielding the learner-facing
//! fields with no harness and no variant-suffixed keys, or for grading,
//! yielding only the harness.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::model::{Cycle, Level, Scenario};

/// Suffix marking the advanced variant of a document key.
pub const ADVANCED_SUFFIX: &str = "Advanced";

/// Document keys that hold harness code.
const HARNESS_KEYS: &[&str] = &["testCode", "test_code"];

/// What the resolved content is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Display,
    Grading,
}

/// Learner-facing view of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleView {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starter_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub briefing: Option<String>,
    #[serde(rename = "expectedPrintOutput", skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Learner-facing view of a whole week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioView {
    pub week: u32,
    pub cycles: Vec<CycleView>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Harness chosen for grading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessSelection {
    Harness(String),
    /// The cycle is not auto-graded.
    NoHarness,
}

/// Result of [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Display(CycleView),
    Grading(HarnessSelection),
}

/// Resolve `cycle` at position `index` for a learner at `level`.
pub fn resolve(cycle: &Cycle, index: usize, level: Level, purpose: Purpose) -> Resolution {
    match purpose {
        Purpose::Display => Resolution::Display(resolve_display(cycle, index, level)),
        Purpose::Grading => Resolution::Grading(match resolve_harness(cycle, level) {
            Some(harness) => HarnessSelection::Harness(harness.to_string()),
            None => HarnessSelection::NoHarness,
        }),
    }
}

/// Select starter code, task and briefing for display.
pub fn resolve_display(cycle: &Cycle, index: usize, level: Level) -> CycleView {
    CycleView {
        index,
        starter_code: cycle.starter_code.select(level).map(str::to_string),
        task: cycle.task.select(level).map(str::to_string),
        briefing: cycle.briefing.select(level).map(str::to_string),
        expected_output: cycle.expected_output.clone(),
        extra: display_safe(&cycle.extra),
    }
}

/// Select the grading harness, or `None` when neither variant is present.
pub fn resolve_harness(cycle: &Cycle, level: Level) -> Option<&str> {
    cycle.test_code.select(level)
}

/// Resolve every cycle of a week for display.
pub fn resolve_scenario_display(scenario: &Scenario, level: Level) -> ScenarioView {
    ScenarioView {
        week: scenario.week,
        cycles: scenario
            .cycles
            .iter()
            .enumerate()
            .map(|(index, cycle)| resolve_display(cycle, index, level))
            .collect(),
        extra: display_safe(&scenario.extra),
    }
}

/// Whether a document key may be shown to learners.
pub fn is_display_safe_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    !(key.ends_with(ADVANCED_SUFFIX)
        || lower.ends_with("_advanced")
        || HARNESS_KEYS.contains(&key)
        || lower.starts_with("testcode")
        || lower.starts_with("test_code"))
}

fn display_safe(extra: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    extra
        .iter()
        .filter(|(key, _)| is_display_safe_key(key))
        .map(|(key, value)| (key.clone(), strip_value(value)))
        .collect()
}

/// Nested objects are filtered the same way as top-level keys.
fn strip_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| is_display_safe_key(key))
                .map(|(key, v)| (key.clone(), strip_value(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_value).collect()),
        other => other.clone(),
    }
}
