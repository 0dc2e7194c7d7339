//! Repository acquisition.
//!
//! The production implementation shells out to the git CLI; the trait seam
//! exists so the workflow can be exercised without network access.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use rta_common::AgentError;
use rta_common::util::mask_remote_url;
use tokio::process::Command;
use tracing::{debug, info};

/// Source of repository working copies.
#[allow(async_fn_in_trait)]
pub trait RepoSource: Send + Sync {
    /// Clone `url` into `dest` and return the working-copy path.
    ///
    /// Must not overwrite a non-empty destination; the caller is responsible
    /// for pre-cleaning stale paths.
    async fn acquire(&self, url: &str, dest: &Path) -> Result<PathBuf, AgentError>;
}

/// Clones with the git command-line client.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    token: Option<String>,
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client that injects `token` into https remotes, for private
    /// repositories.
    pub fn with_token(token: Option<String>) -> Self {
        Self { token }
    }

    fn authenticated_url(&self, url: &str) -> String {
        match &self.token {
            Some(token) if url.starts_with("https://") && !url.contains('@') => {
                format!("https://{token}@{}", &url["https://".len()..])
            }
            _ => url.to_string(),
        }
    }
}

impl RepoSource for GitCli {
    async fn acquire(&self, url: &str, dest: &Path) -> Result<PathBuf, AgentError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| AgentError::Acquisition {
                    url: mask_remote_url(url),
                    reason: format!("could not create {}: {err}", parent.display()),
                })?;
        }

        info!(url = %mask_remote_url(url), dest = %dest.display(), "cloning repository");
        let output = Command::new("git")
            .arg("clone")
            .arg(self.authenticated_url(url))
            .arg(dest)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| AgentError::Acquisition {
                url: mask_remote_url(url),
                reason: format!("failed to run git: {err}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AgentError::Acquisition {
                url: mask_remote_url(url),
                // git echoes the remote in its errors; keep tokens out of
                // reports and logs.
                reason: mask_remote_url(&stderr),
            });
        }

        debug!(dest = %dest.display(), "clone complete");
        Ok(dest.to_path_buf())
    }
}
