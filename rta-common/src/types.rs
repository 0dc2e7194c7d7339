//! Boundary records for the testing stage.

use serde::{Deserialize, Serialize};

use crate::util::truncate_chars;

/// Typed input delivered to the testing stage by the dispatch runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestingRequest {
    /// URL of the repository to clone and test.
    pub repo_url: String,
    /// Accepted for contract compatibility with the coordinator; the testing
    /// stage runs unattended either way.
    #[serde(default)]
    pub human_in_the_loop: bool,
}

/// Outcome of one test-suite run against one repository.
///
/// Populated exactly once along the single execution path and handed back to
/// the caller as plain data; every failure mode below the workflow boundary
/// is encoded here rather than surfaced as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Whether the test suite passed.
    pub passed: bool,
    /// Full combined output of the run, or a synthesized error message.
    /// Stored in full; use [`TestResult::report_snippet`] for display.
    pub report: String,
    /// Coverage percentage from the instrumentation summary, when one was
    /// recognized in the output. Absent, not zero, otherwise.
    #[serde(default)]
    pub coverage: Option<f64>,
    /// Local path the repository was cloned into. Informational: the path is
    /// deleted during cleanup before the result is returned.
    pub repo_path: String,
    /// Wall-clock duration of the whole invocation, in seconds.
    #[serde(default)]
    pub duration_secs: f64,
}

impl TestResult {
    /// A pessimistic result for a run that has not completed yet.
    pub fn pending(repo_path: impl Into<String>) -> Self {
        Self {
            passed: false,
            report: "Execution did not complete.".to_string(),
            coverage: None,
            repo_path: repo_path.into(),
            duration_secs: 0.0,
        }
    }

    /// The first `max_chars` characters of the report, for display.
    pub fn report_snippet(&self, max_chars: usize) -> &str {
        truncate_chars(&self.report, max_chars)
    }
}
