//! The `eduverse-grade init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("eduverse.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("scenarios")?;
    write_if_missing(Path::new("scenarios/week-1.json"), EXAMPLE_SCENARIO)?;
    write_if_missing(Path::new("profiles.json"), EXAMPLE_PROFILES)?;

    println!("\nNext steps:");
    println!("  1. Run: eduverse-grade validate --scenarios scenarios");
    println!("  2. Run: eduverse-grade show --week 1 --level advanced");
    println!(
        "  3. Run: eduverse-grade grade --week 1 --cycle 0 --learner learner@example.com --source solution.py"
    );

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# eduverse grader configuration

timeout_secs = 5
interpreter = "python3"
file_suffix = ".py"
scenarios_path = "scenarios"
profiles_path = "profiles.json"
parallelism = 4
# submission_log = "logs/submissions.jsonl"
# scratch_dir = "${TMPDIR}/eduverse"
"#;

const EXAMPLE_SCENARIO: &str = r##"[
  {
    "week": 1,
    "title": "Functions",
    "cycles": [
      {
        "briefing": "Functions bundle steps you want to reuse.",
        "task": "Write add(a, b) that returns the sum of a and b.",
        "taskAdvanced": "Write add(*nums) that returns the sum of any number of arguments.",
        "starterCode": "def add(a, b):\n    pass\n",
        "starterCodeAdvanced": "def add(*nums):\n    pass\n",
        "testCode": "assert add(1, 2) == 3, 'add(1, 2) should be 3'\nassert add(-1, 1) == 0\n",
        "testCodeAdvanced": "assert add(1, 2, 3) == 6, 'add(1, 2, 3) should be 6'\nassert add() == 0\n"
      },
      {
        "briefing": "print writes a line to the screen.",
        "task": "Print Hello, World!",
        "starterCode": "",
        "testCode": "# printed output is compared with expectedPrintOutput\n",
        "expectedPrintOutput": "Hello, World!"
      },
      {
        "briefing": "Read the notes and try things out. This cycle is not graded.",
        "task": "Experiment freely."
      }
    ]
  }
]
"##;

const EXAMPLE_PROFILES: &str = r#"[
  { "learnerId": "learner@example.com", "name": "Example Learner", "level": "beginner" },
  { "learnerId": "advanced@example.com", "name": "Advanced Learner", "level": "advanced" }
]
"#;
