//! Repository Testing Agent - isolated test execution for remote repositories.
//!
//! One invocation is one asynchronous task: clone the repository into a
//! per-invocation working copy, run its test suite with coverage inside a
//! disposable Docker sandbox, interpret the captured output, and remove the
//! working copy on every exit path. All failures below the workflow boundary
//! are encoded into the returned [`rta_common::TestResult`].

pub mod acquire;
pub mod janitor;
pub mod sandbox;
pub mod stage;
pub mod workflow;

pub use stage::{PipelineStage, STAGE_NAME};
pub use workflow::TestingAgent;
