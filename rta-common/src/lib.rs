//! Shared types and utilities for the Repository Testing Agent.
//!
//! The `rta` binary carries the workflow itself (clone, sandboxed execution,
//! cleanup); this crate holds everything both sides of the stage boundary
//! need: the result and request records, the error taxonomy, configuration,
//! logging setup, and the pure output interpreter.

pub mod config;
pub mod errors;
pub mod interpret;
pub mod logging;
pub mod types;
pub mod util;

pub use config::AgentConfig;
pub use errors::AgentError;
pub use interpret::{EXIT_MARKER, Interpretation, interpret_output};
pub use logging::{LogConfig, init_logging};
pub use types::{TestResult, TestingRequest};
