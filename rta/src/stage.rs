//! Pipeline-stage boundary.
//!
//! The multi-agent dispatch runtime addresses stages by stable name and
//! delivers one typed input per invocation. The runtime itself lives
//! elsewhere; this is the whole surface the testing stage exposes to it.

use rta_common::{TestResult, TestingRequest};

use crate::acquire::RepoSource;
use crate::sandbox::Sandbox;
use crate::workflow::TestingAgent;

/// Stable name this stage registers under.
pub const STAGE_NAME: &str = "testing";

/// A stage in the coordinator's pipeline.
#[allow(async_fn_in_trait)]
pub trait PipelineStage {
    fn name(&self) -> &'static str;

    /// Handle one dispatched request. Total: all failures are encoded in the
    /// result.
    async fn handle(&self, request: TestingRequest) -> TestResult;
}

impl<S: Sandbox, R: RepoSource> PipelineStage for TestingAgent<S, R> {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    async fn handle(&self, request: TestingRequest) -> TestResult {
        self.build_and_run_tests(&request.repo_url).await
    }
}
