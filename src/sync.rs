//! Local mirror of the dataset metadata repository.
//!
//! A missing checkout is cloned and an existing one is fast-forwarded. The
//! "destination already exists" case never reaches `git clone`: the checkout
//! is inspected first and routed to a pull instead. Every other git failure
//! is returned as a [`SyncError`] so the caller can decide whether a stale
//! checkout is good enough.

use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Cloned,
    Updated,
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Cloned => "cloned",
            SyncOutcome::Updated => "updated",
        }
    }

    /// True when this sync created the checkout from scratch.
    pub fn is_fresh(&self) -> bool {
        matches!(self, SyncOutcome::Cloned)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("git executable not found on PATH")]
    GitUnavailable(#[source] io::Error),

    #[error("{} exists but is not a git checkout", path.display())]
    NotACheckout { path: PathBuf },

    #[error("git clone of {remote} failed ({status}): {stderr}")]
    Clone {
        remote: String,
        status: String,
        stderr: String,
    },

    #[error("git pull in {} failed ({status}): {stderr}", path.display())]
    Pull {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("inspecting {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Clone `remote_url` into `local_path`, or pull if a checkout is already there.
pub fn ensure_local_mirror(remote_url: &str, local_path: &Path) -> Result<SyncOutcome, SyncError> {
    match checkout_state(local_path)? {
        CheckoutState::Absent => {
            info!(remote = remote_url, path = %local_path.display(), "cloning metadata repository");
            let output = run_git(
                None,
                [
                    OsStr::new("clone"),
                    OsStr::new("--quiet"),
                    OsStr::new(remote_url),
                    local_path.as_os_str(),
                ],
            )?;
            if !output.status.success() {
                return Err(SyncError::Clone {
                    remote: remote_url.to_string(),
                    status: output.status.to_string(),
                    stderr: stderr_text(&output),
                });
            }
            Ok(SyncOutcome::Cloned)
        }
        CheckoutState::Checkout => {
            info!(path = %local_path.display(), "pulling metadata repository");
            let output = run_git(
                Some(local_path),
                [
                    OsStr::new("pull"),
                    OsStr::new("--ff-only"),
                    OsStr::new("--quiet"),
                ],
            )?;
            if !output.status.success() {
                return Err(SyncError::Pull {
                    path: local_path.to_path_buf(),
                    status: output.status.to_string(),
                    stderr: stderr_text(&output),
                });
            }
            Ok(SyncOutcome::Updated)
        }
        CheckoutState::Foreign => Err(SyncError::NotACheckout {
            path: local_path.to_path_buf(),
        }),
    }
}

/// True when `path` looks like a git working copy.
pub fn is_checkout(path: &Path) -> bool {
    path.join(".git").exists()
}

/// True when `git --version` runs successfully.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

enum CheckoutState {
    Absent,
    Checkout,
    Foreign,
}

fn checkout_state(path: &Path) -> Result<CheckoutState, SyncError> {
    if !path.exists() {
        return Ok(CheckoutState::Absent);
    }
    if is_checkout(path) {
        return Ok(CheckoutState::Checkout);
    }
    // git clones happily into an empty directory.
    if path.is_dir() {
        let mut entries = fs::read_dir(path).map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if entries.next().is_none() {
            return Ok(CheckoutState::Absent);
        }
    }
    Ok(CheckoutState::Foreign)
}

fn run_git<I, S>(cwd: Option<&Path>, args: I) -> Result<Output, SyncError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new("git");
    if let Some(dir) = cwd {
        cmd.arg("-C").arg(dir);
    }
    cmd.args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    debug!(command = ?cmd, "running git");
    cmd.output().map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            SyncError::GitUnavailable(err)
        } else {
            SyncError::Io {
                path: cwd.map(Path::to_path_buf).unwrap_or_default(),
                source: err,
            }
        }
    })
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels() {
        assert_eq!(SyncOutcome::Cloned.as_str(), "cloned");
        assert_eq!(SyncOutcome::Updated.as_str(), "updated");
    }

    #[test]
    fn only_a_clone_is_fresh() {
        assert!(SyncOutcome::Cloned.is_fresh());
        assert!(!SyncOutcome::Updated.is_fresh());
    }

    #[test]
    fn non_empty_directory_without_git_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README"), "not a repo").unwrap();
        let err = ensure_local_mirror("https://example.invalid/repo.git", dir.path()).unwrap_err();
        assert!(matches!(err, SyncError::NotACheckout { .. }), "got {err:?}");
    }
}
