//! Error taxonomy for the testing workflow.
//!
//! Every variant here is caught at the workflow boundary and encoded into a
//! [`crate::TestResult`]; nothing escapes `build_and_run_tests` as an error.

/// Failures that can occur below the workflow boundary.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Clone failed: network, auth, or path conflict.
    #[error("repository acquisition failed for {url}: {reason}")]
    Acquisition { url: String, reason: String },

    /// The sandbox environment could not be started at all.
    #[error("sandbox could not be started: {0}")]
    SandboxStart(String),

    /// The sandboxed command exceeded the wall-clock timeout.
    #[error("execution timed out after {0}s")]
    ExecutionTimeout(u64),

    /// The command sequence errored abnormally inside the sandbox.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The run was cancelled from outside.
    #[error("execution cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Whether this failure was the wall-clock timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ExecutionTimeout(_))
    }

    /// Whether this failure was an external cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
