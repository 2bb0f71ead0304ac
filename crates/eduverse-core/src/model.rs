//! Core data model types for eduverse.
//!
//! Scenarios and cycles are read-only curriculum records; learner profiles
//! carry the proficiency level that picks between base and advanced content.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Learner proficiency level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Advanced,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Beginner => write!(f, "beginner"),
            Level::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "base" => Ok(Level::Beginner),
            "advanced" => Ok(Level::Advanced),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// A level-sensitive field: a base value and an optional advanced variant.
///
/// Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelVariant {
    pub base: Option<String>,
    pub advanced: Option<String>,
}

impl LevelVariant {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            advanced: None,
        }
    }

    pub fn with_advanced(mut self, advanced: impl Into<String>) -> Self {
        self.advanced = Some(advanced.into());
        self
    }

    pub fn advanced_only(advanced: impl Into<String>) -> Self {
        Self {
            base: None,
            advanced: Some(advanced.into()),
        }
    }

    /// Pick the variant for `level`: the advanced value iff the learner is
    /// advanced and that value is present, the base value otherwise.
    pub fn select(&self, level: Level) -> Option<&str> {
        let base = present(self.base.as_deref());
        match level {
            Level::Advanced => present(self.advanced.as_deref()).or(base),
            Level::Beginner => base,
        }
    }

    pub fn has_base(&self) -> bool {
        present(self.base.as_deref()).is_some()
    }

    pub fn has_advanced(&self) -> bool {
        present(self.advanced.as_deref()).is_some()
    }

    /// Neither variant is present.
    pub fn is_absent(&self) -> bool {
        !self.has_base() && !self.has_advanced()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// One graded exercise within a scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CycleRecord", into = "CycleRecord")]
pub struct Cycle {
    pub starter_code: LevelVariant,
    pub task: LevelVariant,
    pub briefing: LevelVariant,
    /// Instructor-authored harness appended to the learner's code.
    pub test_code: LevelVariant,
    /// Exact stdout the learner's code must print on its own, if any.
    pub expected_output: Option<String>,
    /// Any other display keys carried by the document.
    pub extra: BTreeMap<String, Value>,
}

/// Wire shape of a cycle document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CycleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    starter_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    starter_code_advanced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    task_advanced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    briefing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    briefing_advanced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    test_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    test_code_advanced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expected_print_output: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl From<CycleRecord> for Cycle {
    fn from(r: CycleRecord) -> Self {
        Self {
            starter_code: LevelVariant {
                base: r.starter_code,
                advanced: r.starter_code_advanced,
            },
            task: LevelVariant {
                base: r.task,
                advanced: r.task_advanced,
            },
            briefing: LevelVariant {
                base: r.briefing,
                advanced: r.briefing_advanced,
            },
            test_code: LevelVariant {
                base: r.test_code,
                advanced: r.test_code_advanced,
            },
            expected_output: r.expected_print_output,
            extra: r.extra,
        }
    }
}

impl From<Cycle> for CycleRecord {
    fn from(c: Cycle) -> Self {
        Self {
            starter_code: c.starter_code.base,
            starter_code_advanced: c.starter_code.advanced,
            task: c.task.base,
            task_advanced: c.task.advanced,
            briefing: c.briefing.base,
            briefing_advanced: c.briefing.advanced,
            test_code: c.test_code.base,
            test_code_advanced: c.test_code.advanced,
            expected_print_output: c.expected_output,
            extra: c.extra,
        }
    }
}

/// The weekly unit of curriculum content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub week: u32,
    #[serde(default)]
    pub cycles: Vec<Cycle>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Scenario {
    pub fn new(week: u32, cycles: Vec<Cycle>) -> Self {
        Self {
            week,
            cycles,
            extra: BTreeMap::new(),
        }
    }

    pub fn cycle(&self, index: usize) -> Option<&Cycle> {
        self.cycles.get(index)
    }
}

/// A learner as seen by the grader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    #[serde(alias = "email")]
    pub learner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
}

impl LearnerProfile {
    pub fn new(learner_id: impl Into<String>, level: Level) -> Self {
        Self {
            learner_id: learner_id.into(),
            name: None,
            level,
            class_id: None,
        }
    }
}

/// A validated grading request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub learner_id: String,
    pub week: u32,
    pub cycle: usize,
    pub source: String,
}

/// An inbound grading body before validation; every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(default, alias = "email")]
    pub learner_id: Option<String>,
    #[serde(default)]
    pub week: Option<Value>,
    #[serde(default)]
    pub cycle: Option<Value>,
    #[serde(default, alias = "code")]
    pub source: Option<String>,
}
