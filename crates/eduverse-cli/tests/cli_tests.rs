//! CLI integration tests using assert_cmd.
//!
//! Grading tests use `sh` as the interpreter so they do not depend on a
//! Python install.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn grader() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("eduverse-grade").unwrap();
    cmd.env_remove("EDUVERSE_INTERPRETER")
        .env_remove("EDUVERSE_TIMEOUT_SECS");
    cmd
}

const ADD_CHECK: &str =
    "[ \"$(add 1 2)\" = 3 ] || { echo 'AssertionError: add 1 2 should be 3' >&2; exit 1; }\n";
const ADD_CHECK_ADVANCED: &str =
    "[ \"$(add 1 2 3)\" = 6 ] || { echo 'AssertionError: add 1 2 3 should be 6' >&2; exit 1; }\n";
const ADD_SOURCE: &str = "add() { echo $(($1 + $2)); }\n";

/// A workspace with an `sh` config, one week of scenarios and two learners.
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("eduverse.toml"),
        r#"
timeout_secs = 5
interpreter = "sh"
file_suffix = ".sh"
scenarios_path = "scenarios.json"
profiles_path = "profiles.json"
parallelism = 2
"#,
    )
    .unwrap();

    let scenarios = json!([{
        "week": 1,
        "cycles": [
            {
                "task": "Write add.",
                "taskAdvanced": "Write a variadic add.",
                "testCode": ADD_CHECK,
                "testCodeAdvanced": ADD_CHECK_ADVANCED
            },
            { "task": "Explore." },
            { "task": "Print hello.", "testCode": ":", "expectedPrintOutput": "hello" },
            { "task": "Loop forever.", "testCode": "while :; do :; done" }
        ]
    }]);
    std::fs::write(
        dir.path().join("scenarios.json"),
        serde_json::to_string_pretty(&scenarios).unwrap(),
    )
    .unwrap();

    let profiles = json!([
        { "learnerId": "kim", "level": "beginner", "classId": "class-a" },
        { "learnerId": "lee", "level": "advanced" }
    ]);
    std::fs::write(
        dir.path().join("profiles.json"),
        serde_json::to_string(&profiles).unwrap(),
    )
    .unwrap();

    write_source(dir.path(), "add.sh", ADD_SOURCE);
    dir
}

fn write_source(dir: &Path, name: &str, source: &str) {
    std::fs::write(dir.join(name), source).unwrap();
}

fn grade(dir: &Path, learner: &str, cycle: usize, source: &str) -> Command {
    let mut cmd = grader();
    cmd.current_dir(dir)
        .arg("grade")
        .args(["--week", "1", "--cycle"])
        .arg(cycle.to_string())
        .args(["--learner", learner, "--source", source])
        .args(["--config", "eduverse.toml"]);
    cmd
}

#[test]
fn grade_beginner_passes() {
    let dir = workspace();
    grade(dir.path(), "kim", 0, "add.sh")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"))
        .stdout(predicate::str::contains("\"message\": \"\""));
}

#[test]
fn grade_advanced_learner_gets_advanced_harness() {
    let dir = workspace();
    grade(dir.path(), "lee", 0, "add.sh")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": false"))
        .stdout(predicate::str::contains("add 1 2 3 should be 6"));
}

#[test]
fn grade_cycle_without_harness_passes() {
    let dir = workspace();
    write_source(dir.path(), "broken.sh", "exit 9\n");
    grade(dir.path(), "kim", 1, "broken.sh")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));
}

#[test]
fn grade_checks_printed_output() {
    let dir = workspace();
    write_source(dir.path(), "hello.sh", "echo hello\n");
    write_source(dir.path(), "bye.sh", "echo bye\n");

    grade(dir.path(), "kim", 2, "hello.sh")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));

    grade(dir.path(), "kim", 2, "bye.sh")
        .assert()
        .success()
        .stdout(predicate::str::contains("Output mismatch"));
}

#[test]
fn grade_reports_timeout() {
    let dir = workspace();
    write_source(dir.path(), "noop.sh", ":\n");
    grade(dir.path(), "kim", 3, "noop.sh")
        .args(["--timeout", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": false"))
        .stdout(predicate::str::contains("Time limit exceeded"))
        .stdout(predicate::str::contains("1 second"));
}

#[test]
fn grade_rejects_out_of_range_cycle() {
    let dir = workspace();
    grade(dir.path(), "kim", 7, "add.sh")
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn grade_rejects_unknown_learner() {
    let dir = workspace();
    grade(dir.path(), "nobody", 0, "add.sh")
        .assert()
        .failure()
        .stderr(predicate::str::contains("learner profile not found"));
}

#[test]
fn grade_appends_submission_log() {
    let dir = workspace();
    grade(dir.path(), "lee", 0, "add.sh")
        .args(["--log", "logs/submissions.jsonl"])
        .assert()
        .success();
    grade(dir.path(), "kim", 0, "add.sh")
        .args(["--log", "logs/submissions.jsonl"])
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join("logs/submissions.jsonl")).unwrap();
    let records: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["learnerId"], "lee");
    assert_eq!(records[0]["isSuccess"], false);
    assert_eq!(records[0]["error"], "add 1 2 3 should be 6");
    assert_eq!(records[1]["isSuccess"], true);
    assert_eq!(records[1]["classId"], "class-a");
    assert_eq!(records[1]["error"], "");
}

#[test]
fn batch_grades_and_summarizes() {
    let dir = workspace();
    let submissions = json!([
        { "learnerId": "kim", "week": 1, "cycle": 0, "source": ADD_SOURCE },
        { "email": "lee", "week": "1", "cycle": "0", "code": ADD_SOURCE },
        { "learnerId": "kim", "week": 1, "cycle": 0 }
    ]);
    std::fs::write(
        dir.path().join("submissions.json"),
        serde_json::to_string(&submissions).unwrap(),
    )
    .unwrap();

    grader()
        .current_dir(dir.path())
        .args(["batch", "--submissions", "submissions.json"])
        .args(["--config", "eduverse.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("succeeded"))
        .stdout(predicate::str::contains("graded_failed"))
        .stdout(predicate::str::contains(
            "1 passed, 1 failed, 0 timed out, 1 rejected, 0 errored",
        ));
}

#[test]
fn show_hides_harness_and_selects_level() {
    grader()
        .args(["show", "--week", "2", "--level", "advanced"])
        .args(["--scenarios", "../../scenarios"])
        .assert()
        .success()
        .stdout(predicate::str::contains("start=0"))
        .stdout(predicate::str::contains("Start with result = 0."))
        .stdout(predicate::str::contains("testCode").not())
        .stdout(predicate::str::contains("hintAdvanced").not())
        .stdout(predicate::str::contains("assert").not());
}

#[test]
fn show_single_cycle_for_beginner() {
    grader()
        .args(["show", "--week", "1", "--cycle", "0"])
        .args(["--scenarios", "../../scenarios"])
        .assert()
        .success()
        .stdout(predicate::str::contains("returns the sum of a and b"))
        .stdout(predicate::str::contains("*nums").not());
}

#[test]
fn show_missing_week_fails() {
    grader()
        .args(["show", "--week", "42", "--scenarios", "../../scenarios"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scenario for week 42"));
}

#[test]
fn validate_repo_scenarios() {
    grader()
        .args(["validate", "--scenarios", "../../scenarios"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scenarios: 2 (5 cycles)"))
        .stdout(predicate::str::contains("not auto-graded"));
}

#[test]
fn validate_nonexistent_file() {
    grader()
        .args(["validate", "--scenarios", "nonexistent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    grader()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created eduverse.toml"))
        .stdout(predicate::str::contains("Created scenarios/week-1.json"))
        .stdout(predicate::str::contains("Created profiles.json"));

    assert!(dir.path().join("eduverse.toml").exists());
    assert!(dir.path().join("scenarios/week-1.json").exists());

    grader()
        .current_dir(dir.path())
        .args(["validate", "--scenarios", "scenarios"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scenarios: 1 (3 cycles)"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    grader().current_dir(dir.path()).arg("init").assert().success();

    grader()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    grader()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scenario harnesses"));
}
