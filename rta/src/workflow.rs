//! The test orchestration workflow.
//!
//! Sequences acquisition, sandboxed execution, and interpretation, and
//! guarantees janitor cleanup of the working copy on every exit path. The
//! public operation is total: every failure below the boundary is encoded in
//! the returned [`TestResult`], never raised to the caller.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rta_common::util::{mask_remote_url, repo_slug};
use rta_common::{AgentConfig, AgentError, EXIT_MARKER, TestResult, interpret_output};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::acquire::{GitCli, RepoSource};
use crate::janitor;
use crate::sandbox::{DockerSandbox, ExecutionRequest, Sandbox};

/// The testing stage: clone, run the suite in a sandbox, report.
pub struct TestingAgent<S = DockerSandbox, R = GitCli> {
    config: AgentConfig,
    sandbox: S,
    repo_source: R,
}

impl TestingAgent {
    /// An agent with the production collaborators: git CLI acquisition and
    /// Docker sandboxing.
    pub fn new(config: AgentConfig) -> Self {
        let repo_source = GitCli::with_token(config.github_token.clone());
        Self {
            config,
            sandbox: DockerSandbox::new(),
            repo_source,
        }
    }
}

impl<S: Sandbox, R: RepoSource> TestingAgent<S, R> {
    /// An agent with explicit collaborators. Tests use this seam; so would a
    /// runtime that provisions sandboxes differently.
    pub fn with_collaborators(config: AgentConfig, sandbox: S, repo_source: R) -> Self {
        Self {
            config,
            sandbox,
            repo_source,
        }
    }

    /// The sandbox collaborator. Tests inspect what was dispatched to it.
    pub fn sandbox(&self) -> &S {
        &self.sandbox
    }

    /// Clone `repo_url`, run its test suite, and report the outcome.
    pub async fn build_and_run_tests(&self, repo_url: &str) -> TestResult {
        self.build_and_run_tests_with_cancel(repo_url, &CancellationToken::new())
            .await
    }

    /// Like [`TestingAgent::build_and_run_tests`], honoring an external
    /// cancellation signal. Cancellation during execution still runs the
    /// cleanup path before the cancelled result is returned.
    pub async fn build_and_run_tests_with_cancel(
        &self,
        repo_url: &str,
        cancel: &CancellationToken,
    ) -> TestResult {
        // Unique per invocation: concurrent runs against the same URL must
        // never share a working copy.
        let work_dir = self.unique_work_dir(repo_url);
        self.build_and_run_tests_at(repo_url, &work_dir, cancel).await
    }

    /// Run the workflow against an explicit working-copy path.
    ///
    /// Callers that pin paths lose the per-invocation uniqueness guarantee
    /// and with it safety against concurrent runs on the same repository.
    pub async fn build_and_run_tests_at(
        &self,
        repo_url: &str,
        work_dir: &Path,
        cancel: &CancellationToken,
    ) -> TestResult {
        let started = Instant::now();
        let mut result = TestResult::pending(work_dir.display().to_string());

        match self.run_inner(repo_url, work_dir, cancel).await {
            Ok(output) => {
                let interpretation = interpret_output(&output);
                result.passed = interpretation.passed;
                result.coverage = interpretation.coverage;
                result.report = output;
            }
            Err(err) => {
                result.passed = false;
                result.report = format!("Unexpected error during sandbox execution: {err}");
            }
        }

        // Guaranteed finalizer: runs whether execution completed, errored, or
        // was cancelled. Cleanup failure is logged and never alters the
        // already-computed result.
        if let Err(err) = janitor::remove_tree(
            work_dir,
            janitor::DEFAULT_MAX_ATTEMPTS,
            janitor::DEFAULT_BASE_DELAY,
        )
        .await
        {
            warn!(
                path = %work_dir.display(),
                error = %err,
                "failed to clean up working copy"
            );
        } else {
            info!(path = %work_dir.display(), "cleaned up working copy");
        }

        result.duration_secs = started.elapsed().as_secs_f64();
        result
    }

    async fn run_inner(
        &self,
        repo_url: &str,
        work_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        // Stale path from a previous pinned-path run: pre-clean, but proceed
        // optimistically if that fails and let the clone surface the error.
        if work_dir.exists() {
            if let Err(err) = janitor::remove_tree(
                work_dir,
                janitor::DEFAULT_MAX_ATTEMPTS,
                janitor::DEFAULT_BASE_DELAY,
            )
            .await
            {
                warn!(
                    path = %work_dir.display(),
                    error = %err,
                    "failed to remove stale working copy, proceeding"
                );
            }
        }

        self.repo_source.acquire(repo_url, work_dir).await?;
        info!(
            url = %mask_remote_url(repo_url),
            path = %work_dir.display(),
            "repository cloned"
        );

        let request = ExecutionRequest {
            script: self.build_script(work_dir),
            work_dir: work_dir.to_path_buf(),
            image: self.config.image.clone(),
            timeout: Duration::from_secs(self.config.timeout_secs),
        };
        info!(
            image = %self.config.image,
            timeout_secs = self.config.timeout_secs,
            "running test suite in sandbox"
        );
        let output = self.sandbox.run(&request, cancel).await?;
        Ok(output.output)
    }

    fn unique_work_dir(&self, repo_url: &str) -> PathBuf {
        let slug = repo_slug(repo_url);
        self.config
            .base_dir
            .join(format!("{slug}-{}", Uuid::new_v4()))
    }

    /// The shell script run inside the sandbox: optional dependency install,
    /// then the suite with coverage. Output is written to `result.log` in the
    /// working copy (host-visible through the bind mount) and streamed back,
    /// followed by the exit marker the interpreter keys on.
    fn build_script(&self, work_dir: &Path) -> String {
        let install = if work_dir.join(&self.config.manifest).exists() {
            format!(
                "pip install -r {} && ",
                shell_escape::escape(Cow::from(self.config.manifest.as_str()))
            )
        } else {
            info!(manifest = %self.config.manifest, "no dependency manifest found, skipping install");
            String::new()
        };
        format!(
            "{install}pytest --maxfail=1 --disable-warnings --cov=. > result.log 2>&1; \
             status=$?; cat result.log; echo \"{EXIT_MARKER}$status\""
        )
    }
}
