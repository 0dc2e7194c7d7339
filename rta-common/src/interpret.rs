//! Interpretation of captured test-run output.
//!
//! Pure functions: deterministic for a given output text, no side effects.
//! The execution script appends a machine-readable exit marker, which is
//! authoritative when present; the `failed` substring heuristic of older
//! runners is kept as a compatibility fallback.

use std::sync::LazyLock;

use regex::Regex;

/// Marker line the execution script appends with the test runner's exit
/// status, e.g. `RTA_EXIT_CODE=0`.
pub const EXIT_MARKER: &str = "RTA_EXIT_CODE=";

/// Coverage-tool summary row: the literal token `TOTAL` followed eventually
/// by a percentage.
static COVERAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TOTAL.*?(\d+(?:\.\d+)?)%").expect("valid coverage pattern"));

/// Signals derived from one run's captured output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpretation {
    /// Whether the run is considered passed.
    pub passed: bool,
    /// Coverage percentage, when a summary row was recognized.
    pub coverage: Option<f64>,
}

/// Derive pass/fail and coverage from captured output text.
///
/// When no exit marker is present, pass/fail falls back to scanning for the
/// case-insensitive substring `failed` anywhere in the text. That heuristic
/// is coarse by design: an unrelated log line containing the word (say, a
/// dependency-install warning) flips the result to failed.
pub fn interpret_output(output: &str) -> Interpretation {
    let passed = match exit_status(output) {
        Some(code) => code == 0,
        None => !contains_failed(output),
    };
    Interpretation {
        passed,
        coverage: coverage_percent(output),
    }
}

/// First recognized coverage percentage in the output, if any.
pub fn coverage_percent(output: &str) -> Option<f64> {
    COVERAGE_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|pct| pct.as_str().parse().ok())
}

/// The exit status from the last marker line, if one parses.
fn exit_status(output: &str) -> Option<i32> {
    output
        .lines()
        .rev()
        .filter_map(|line| line.trim().strip_prefix(EXIT_MARKER))
        .find_map(|status| status.trim().parse().ok())
}

fn contains_failed(output: &str) -> bool {
    output.to_ascii_lowercase().contains("failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_is_parsed_from_summary_row() {
        let output = "collected 12 items\n\nName  Stmts  Miss  Cover\nTOTAL  1200   156    87%\n";
        assert_eq!(coverage_percent(output), Some(87.0));
    }

    #[test]
    fn coverage_absent_without_summary_row() {
        let output = "12 passed in 0.34s\n";
        assert_eq!(coverage_percent(output), None);
        assert_eq!(interpret_output(output).coverage, None);
    }

    #[test]
    fn fractional_coverage_is_accepted() {
        assert_eq!(coverage_percent("TOTAL 200 13 93.5%"), Some(93.5));
    }

    #[test]
    fn heuristic_fails_on_failed_substring() {
        let output = "3 failed, 10 passed in 1.2s\n";
        assert!(!interpret_output(output).passed);
    }

    #[test]
    fn heuristic_is_case_insensitive() {
        assert!(!interpret_output("1 FAILED test").passed);
    }

    #[test]
    fn heuristic_passes_without_failed_substring() {
        let output = "10 passed in 1.2s\nTOTAL 100 8 92%\n";
        let interpretation = interpret_output(output);
        assert!(interpretation.passed);
        assert_eq!(interpretation.coverage, Some(92.0));
    }

    #[test]
    fn exit_marker_overrides_heuristic() {
        // "0 failed" would trip the substring scan; the marker is authoritative.
        let output = "10 passed, 0 failed\nRTA_EXIT_CODE=0\n";
        assert!(interpret_output(output).passed);

        let output = "everything looked fine\nRTA_EXIT_CODE=1\n";
        assert!(!interpret_output(output).passed);
    }

    #[test]
    fn malformed_marker_falls_back_to_heuristic() {
        assert!(interpret_output("all good\nRTA_EXIT_CODE=oops\n").passed);
        assert!(!interpret_output("1 failed\nRTA_EXIT_CODE=oops\n").passed);
    }

    #[test]
    fn last_marker_wins() {
        // A repository's own output could echo a marker; the script appends
        // the real one last.
        let output = "RTA_EXIT_CODE=1\nsome test output\nRTA_EXIT_CODE=0\n";
        assert!(interpret_output(output).passed);
    }
}
