//! Request validation.
//!
//! Every check here runs before an executor is touched, so a rejected
//! request never spawns a process.

use std::sync::Arc;

use serde_json::Value;

use crate::error::GradeError;
use crate::model::{Cycle, LearnerProfile, Scenario, SubmissionPayload, SubmissionRequest};
use crate::traits::{ProfileStore, ScenarioStore};

/// Everything a valid request refers to.
#[derive(Debug, Clone)]
pub struct ResolvedSubmission {
    pub scenario: Scenario,
    pub cycle_index: usize,
    pub cycle: Cycle,
    pub profile: LearnerProfile,
}

/// Resolves a request against the scenario and profile stores.
pub struct RequestValidator {
    scenarios: Arc<dyn ScenarioStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl RequestValidator {
    pub fn new(scenarios: Arc<dyn ScenarioStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            scenarios,
            profiles,
        }
    }

    /// Check `request` and look up what it references, failing on the first
    /// problem found.
    pub async fn validate(
        &self,
        request: &SubmissionRequest,
    ) -> Result<ResolvedSubmission, GradeError> {
        if request.learner_id.trim().is_empty() {
            return Err(GradeError::invalid("learner id", "is blank"));
        }

        let scenario = self
            .scenarios
            .scenario(request.week)
            .await
            .map_err(GradeError::store)?
            .ok_or(GradeError::ScenarioNotFound { week: request.week })?;

        let cycle = scenario
            .cycle(request.cycle)
            .cloned()
            .ok_or(GradeError::CycleOutOfRange {
                week: request.week,
                cycle: request.cycle,
                available: scenario.cycles.len(),
            })?;

        let profile = self
            .profiles
            .profile(&request.learner_id)
            .await
            .map_err(GradeError::store)?
            .ok_or_else(|| GradeError::LearnerNotFound(request.learner_id.clone()))?;

        Ok(ResolvedSubmission {
            scenario,
            cycle_index: request.cycle,
            cycle,
            profile,
        })
    }
}

/// Turn a loosely-typed inbound body into a [`SubmissionRequest`].
pub fn validate_payload(payload: &SubmissionPayload) -> Result<SubmissionRequest, GradeError> {
    let learner_id = match payload.learner_id.as_deref().map(str::trim) {
        None => return Err(GradeError::invalid("learner id", "is missing")),
        Some("") => return Err(GradeError::invalid("learner id", "is blank")),
        Some(id) => id.to_string(),
    };
    let week = non_negative(payload.week.as_ref(), "week")?;
    let week = u32::try_from(week).map_err(|_| GradeError::invalid("week", "is too large"))?;
    let cycle = non_negative(payload.cycle.as_ref(), "cycle")?;
    let cycle = usize::try_from(cycle).map_err(|_| GradeError::invalid("cycle", "is too large"))?;
    let source = payload
        .source
        .clone()
        .ok_or_else(|| GradeError::invalid("source", "is missing"))?;

    Ok(SubmissionRequest {
        learner_id,
        week,
        cycle,
        source,
    })
}

/// Accepts integers and integer strings.
fn non_negative(value: Option<&Value>, field: &'static str) -> Result<u64, GradeError> {
    let value = value.ok_or_else(|| GradeError::invalid(field, "is missing"))?;
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n >= 0 => Ok(n as u64),
        Some(_) => Err(GradeError::invalid(field, "must not be negative")),
        None => Err(GradeError::invalid(field, format!("is not an integer: {value}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::model::{Level, LevelVariant};

    struct Scenarios(HashMap<u32, Scenario>);

    #[async_trait]
    impl ScenarioStore for Scenarios {
        async fn scenario(&self, week: u32) -> anyhow::Result<Option<Scenario>> {
            Ok(self.0.get(&week).cloned())
        }
    }

    #[derive(Default)]
    struct Profiles {
        lookups: AtomicU32,
    }

    #[async_trait]
    impl ProfileStore for Profiles {
        async fn profile(&self, learner_id: &str) -> anyhow::Result<Option<LearnerProfile>> {
            self.lookups.fetch_add(1, Ordering::Relaxed);
            Ok((learner_id == "kim").then(|| LearnerProfile::new("kim", Level::Advanced)))
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl ScenarioStore for BrokenStore {
        async fn scenario(&self, _: u32) -> anyhow::Result<Option<Scenario>> {
            anyhow::bail!("connection refused")
        }
    }

    fn validator() -> (RequestValidator, Arc<Profiles>) {
        let cycle = Cycle {
            test_code: LevelVariant::new("assert True"),
            ..Default::default()
        };
        let scenarios = Scenarios(HashMap::from([(1, Scenario::new(1, vec![cycle]))]));
        let profiles = Arc::new(Profiles::default());
        (
            RequestValidator::new(Arc::new(scenarios), profiles.clone()),
            profiles,
        )
    }

    fn request(learner: &str, week: u32, cycle: usize) -> SubmissionRequest {
        SubmissionRequest {
            learner_id: learner.into(),
            week,
            cycle,
            source: "x = 1".into(),
        }
    }

    #[tokio::test]
    async fn resolves_valid_request() {
        let (validator, _) = validator();
        let resolved = validator.validate(&request("kim", 1, 0)).await.unwrap();
        assert_eq!(resolved.scenario.week, 1);
        assert_eq!(resolved.cycle_index, 0);
        assert_eq!(resolved.profile.level, Level::Advanced);
    }

    #[tokio::test]
    async fn rejects_unknown_week() {
        let (validator, _) = validator();
        let err = validator.validate(&request("kim", 7, 0)).await.unwrap_err();
        assert!(matches!(err, GradeError::ScenarioNotFound { week: 7 }));
    }

    #[tokio::test]
    async fn rejects_out_of_range_cycle_before_profile_lookup() {
        let (validator, profiles) = validator();
        let err = validator.validate(&request("kim", 1, 1)).await.unwrap_err();
        assert!(matches!(
            err,
            GradeError::CycleOutOfRange {
                cycle: 1,
                available: 1,
                ..
            }
        ));
        assert_eq!(profiles.lookups.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn rejects_unknown_learner() {
        let (validator, _) = validator();
        let err = validator.validate(&request("lee", 1, 0)).await.unwrap_err();
        assert!(matches!(err, GradeError::LearnerNotFound(ref id) if id == "lee"));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn rejects_blank_learner() {
        let (validator, _) = validator();
        let err = validator.validate(&request("  ", 1, 0)).await.unwrap_err();
        assert!(matches!(err, GradeError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn store_failure_is_not_a_client_error() {
        let validator = RequestValidator::new(Arc::new(BrokenStore), Arc::new(Profiles::default()));
        let err = validator.validate(&request("kim", 1, 0)).await.unwrap_err();
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("connection refused"));
    }

    fn payload(value: serde_json::Value) -> SubmissionPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn payload_validation() {
        let ok = validate_payload(&payload(
            json!({"learnerId": "kim", "week": 1, "cycle": "2", "source": "x"}),
        ))
        .unwrap();
        assert_eq!(ok.week, 1);
        assert_eq!(ok.cycle, 2);

        let cases = [
            (json!({"week": 1, "cycle": 0, "source": "x"}), "learner id is missing"),
            (json!({"email": " ", "week": 1, "cycle": 0, "source": "x"}), "learner id is blank"),
            (json!({"email": "kim", "cycle": 0, "source": "x"}), "week is missing"),
            (json!({"email": "kim", "week": "one", "cycle": 0, "source": "x"}), "week is not an integer"),
            (json!({"email": "kim", "week": 1, "cycle": -1, "source": "x"}), "cycle must not be negative"),
            (json!({"email": "kim", "week": 1, "cycle": 1.5, "source": "x"}), "cycle is not an integer"),
            (json!({"email": "kim", "week": 1, "cycle": 0}), "source is missing"),
        ];
        for (body, expected) in cases {
            let err = validate_payload(&payload(body)).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "expected '{expected}', got '{err}'"
            );
        }
    }
}
