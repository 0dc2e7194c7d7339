//! Robust removal of working-copy directories.
//!
//! Clones can leave read-only entries behind (git object files), and
//! short-lived lock contention from antivirus scanners or lingering child
//! processes makes a single `remove_dir_all` unreliable. Removal therefore
//! clears read-only bits on permission errors and retries the whole delete a
//! bounded number of times.

use std::io;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Remove `path` and everything under it. A missing path is a successful
/// no-op. The final attempt's error propagates; everything before it is a
/// logged retry.
pub async fn remove_tree(path: &Path, max_attempts: u32, base_delay: Duration) -> io::Result<()> {
    let attempts = max_attempts.max(1);
    for attempt in 1..=attempts {
        let target = path.to_path_buf();
        match tokio::task::spawn_blocking(move || remove_tree_blocking(&target)).await {
            Ok(Ok(())) => {
                if attempt > 1 {
                    debug!(path = %path.display(), attempt, "tree removal succeeded after retry");
                }
                return Ok(());
            }
            Ok(Err(err)) if attempt == attempts => return Err(err),
            Ok(Err(err)) => {
                warn!(
                    path = %path.display(),
                    attempt,
                    error = %err,
                    "tree removal failed, retrying"
                );
                tokio::time::sleep(base_delay).await;
            }
            Err(join_err) => return Err(io::Error::other(join_err)),
        }
    }
    Ok(())
}

fn remove_tree_blocking(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            make_writable(path)?;
            std::fs::remove_dir_all(path)
        }
        Err(err) => Err(err),
    }
}

/// Clear read-only bits over the whole subtree. Entries that vanish mid-walk
/// (another process finishing its own cleanup) are skipped.
fn make_writable(path: &Path) -> io::Result<()> {
    let Ok(metadata) = std::fs::symlink_metadata(path) else {
        return Ok(());
    };
    let mut perms = metadata.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        let _ = std::fs::set_permissions(path, perms);
    }
    if metadata.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let Ok(entry) = entry else { continue };
            make_writable(&entry.path())?;
        }
    }
    Ok(())
}
