//! Concatenation of a submission with its test harness.

use std::fmt;

/// Text placed between the submission and the harness.
pub const HARNESS_SEPARATOR: &str = "\n\n# --- Test Code ---\n";

/// A submission followed by its harness, executed as one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedSource {
    text: String,
    /// Number of lines the submission occupies.
    submission_lines: usize,
}

/// Where a line of a combined program came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    /// 1-based line within the submitted source.
    Submission(usize),
    /// The blank line or the separator comment between the two parts.
    Separator,
    /// 1-based line within the harness.
    Harness(usize),
}

/// Join `submitted` and `harness` with [`HARNESS_SEPARATOR`].
///
/// No validation happens here; malformed code fails when it runs.
pub fn combine(submitted: &str, harness: &str) -> CombinedSource {
    let mut text = String::with_capacity(submitted.len() + HARNESS_SEPARATOR.len() + harness.len());
    text.push_str(submitted);
    text.push_str(HARNESS_SEPARATOR);
    text.push_str(harness);
    CombinedSource {
        text,
        submission_lines: submitted.split('\n').count(),
    }
}

impl CombinedSource {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// 1-based line number of the first harness line.
    pub fn harness_first_line(&self) -> usize {
        self.submission_lines + 3
    }

    /// Attribute a 1-based line number of the combined program.
    pub fn origin_of_line(&self, line: usize) -> Option<LineOrigin> {
        if line == 0 || line > self.text.split('\n').count() {
            return None;
        }
        let first_harness = self.harness_first_line();
        Some(if line <= self.submission_lines {
            LineOrigin::Submission(line)
        } else if line < first_harness {
            LineOrigin::Separator
        } else {
            LineOrigin::Harness(line - first_harness + 1)
        })
    }
}

impl fmt::Display for CombinedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for CombinedSource {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_wire_format() {
        let combined = combine("def add(a, b):\n    return a + b", "assert add(1, 2) == 3");
        assert_eq!(
            combined.as_str(),
            "def add(a, b):\n    return a + b\n\n# --- Test Code ---\nassert add(1, 2) == 3"
        );
    }

    #[test]
    fn line_attribution() {
        let combined = combine("a = 1\nb = 2", "assert a\nassert b");
        assert_eq!(combined.harness_first_line(), 5);
        assert_eq!(combined.origin_of_line(1), Some(LineOrigin::Submission(1)));
        assert_eq!(combined.origin_of_line(2), Some(LineOrigin::Submission(2)));
        assert_eq!(combined.origin_of_line(3), Some(LineOrigin::Separator));
        assert_eq!(combined.origin_of_line(4), Some(LineOrigin::Separator));
        assert_eq!(combined.origin_of_line(5), Some(LineOrigin::Harness(1)));
        assert_eq!(combined.origin_of_line(6), Some(LineOrigin::Harness(2)));
        assert_eq!(combined.origin_of_line(7), None);
        assert_eq!(combined.origin_of_line(0), None);

        let lines: Vec<&str> = combined.as_str().split('\n').collect();
        assert_eq!(lines[3], "# --- Test Code ---");
        assert_eq!(lines[4], "assert a");
    }

    #[test]
    fn trailing_newline_in_submission() {
        let combined = combine("x = 1\n", "assert x");
        let lines: Vec<&str> = combined.as_str().split('\n').collect();
        assert_eq!(lines[combined.harness_first_line() - 1], "assert x");
    }

    #[test]
    fn empty_submission_still_combines() {
        let combined = combine("", "assert True");
        assert_eq!(combined.as_str(), "\n\n# --- Test Code ---\nassert True");
        assert_eq!(combined.origin_of_line(4), Some(LineOrigin::Harness(1)));
    }
}
