//! Disposable Docker sandbox for test execution.
//!
//! Each run starts a fresh container with the working copy bind-mounted at
//! `/workspace`, so files the suite writes (`result.log`) are visible on the
//! host afterwards. The container is exclusively owned by one invocation and
//! torn down on every exit path, including timeout and cancellation.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use rta_common::AgentError;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// Container path the host working copy is mounted at.
pub const CONTAINER_WORKDIR: &str = "/workspace";

/// One command sequence to run inside an isolated environment.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Shell script executed inside the sandbox.
    pub script: String,
    /// Host directory bind-mounted as the sandbox working directory.
    pub work_dir: PathBuf,
    /// Sandbox image.
    pub image: String,
    /// Hard wall-clock limit for the run.
    pub timeout: Duration,
}

/// Captured combined stdout/stderr of a sandboxed run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOutput {
    pub output: String,
}

/// An isolated, resource-bounded execution environment.
///
/// Implementations run the script, enforce the timeout, and release the
/// environment before returning. They never interpret pass/fail.
#[allow(async_fn_in_trait)]
pub trait Sandbox: Send + Sync {
    async fn run(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutput, AgentError>;
}

/// Runs scripts in throwaway Docker containers.
#[derive(Debug, Clone, Default)]
pub struct DockerSandbox;

impl DockerSandbox {
    pub fn new() -> Self {
        Self
    }

    fn build_command(request: &ExecutionRequest, name: &str) -> Command {
        let mut cmd = Command::new("docker");
        cmd.arg("run")
            .arg("--rm")
            .arg("--name")
            .arg(name)
            .arg("--mount")
            .arg(format!(
                "type=bind,source={},target={CONTAINER_WORKDIR}",
                request.work_dir.display()
            ))
            .arg("--workdir")
            .arg(CONTAINER_WORKDIR)
            .arg(&request.image)
            .arg("/bin/sh")
            .arg("-c")
            .arg(&request.script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future (timeout, cancellation) must not leave
            // the docker client running.
            .kill_on_drop(true);
        cmd
    }
}

impl Sandbox for DockerSandbox {
    async fn run(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutput, AgentError> {
        let name = format!("rta-{}", Uuid::new_v4());
        let mut cmd = Self::build_command(request, &name);

        debug!(container = %name, image = %request.image, "starting sandbox");
        let child = cmd
            .spawn()
            .map_err(|err| AgentError::SandboxStart(format!("failed to run docker: {err}")))?;

        let wait = child.wait_with_output();

        let outcome = tokio::select! {
            result = wait => match result {
                Ok(output) => {
                    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                    combined.push_str(&String::from_utf8_lossy(&output.stderr));
                    if output.status.success() {
                        Ok(ExecutionOutput { output: combined })
                    } else {
                        // The script itself always exits 0; a non-zero
                        // container status means the sandbox broke (image
                        // pull failure, missing shell, OOM kill).
                        Err(AgentError::Execution(format!(
                            "sandbox exited with {}: {}",
                            output.status,
                            combined.trim()
                        )))
                    }
                }
                Err(err) => Err(AgentError::Execution(format!(
                    "failed to collect sandbox output: {err}"
                ))),
            },
            () = tokio::time::sleep(request.timeout) => {
                warn!(
                    container = %name,
                    timeout_secs = request.timeout.as_secs(),
                    "sandbox exceeded timeout, killing container"
                );
                kill_container(&name).await;
                Err(AgentError::ExecutionTimeout(request.timeout.as_secs()))
            }
            () = cancel.cancelled() => {
                debug!(container = %name, "run cancelled, killing container");
                kill_container(&name).await;
                Err(AgentError::Cancelled)
            }
        };

        // `--rm` reaps completed containers; this catches the kill paths and
        // any daemon hiccup. Failure here is expected noise.
        teardown_container(&name).await;
        outcome
    }
}

async fn kill_container(name: &str) {
    run_docker_quietly(&["kill", name]).await;
}

async fn teardown_container(name: &str) {
    run_docker_quietly(&["rm", "--force", name]).await;
}

async fn run_docker_quietly(args: &[&str]) {
    let result = Command::new("docker")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    if let Err(err) = result {
        debug!(?args, error = %err, "docker cleanup command failed");
    }
}
