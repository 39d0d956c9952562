//! Detached process launching.
//!
//! Launches are fire-and-forget: the caller gets no handle and no result.
//! Spawn failures are logged and swallowed so the shell keeps running.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::{Error, Result};

pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Starts external commands on behalf of the shell.
pub trait Launcher {
    /// Run `command_line` through a command interpreter without waiting.
    fn launch(&self, command_line: &str);
}

/// Spawns commands through `sh -c` in their own process group.
///
/// Each child gets a background task awaiting its exit, which reaps it.
/// Must be used from inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct DetachedLauncher {
    shell: String,
}

impl DetachedLauncher {
    #[must_use]
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Spawn and hand the child to a reaper task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Process`] for an empty command line or when the
    /// interpreter cannot be spawned.
    pub fn spawn_detached(&self, command_line: &str) -> Result<u32> {
        if command_line.trim().is_empty() {
            return Err(Error::Process("Empty command".to_string()));
        }

        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|e| Error::Process(format!("Failed to spawn {}: {e}", self.shell)))?;

        let pid = child.id().unwrap_or_default();
        let command = command_line.to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!("[{pid}] {command} exited: {status}"),
                Err(e) => warn!("[{pid}] Failed to reap {command}: {e}"),
            }
        });

        Ok(pid)
    }
}

impl Default for DetachedLauncher {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl Launcher for DetachedLauncher {
    fn launch(&self, command_line: &str) {
        match self.spawn_detached(command_line) {
            Ok(pid) => debug!("Launched [{pid}]: {command_line}"),
            Err(e) => warn!("Launch of '{command_line}' failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawn_detached_runs_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("launched");
        let launcher = DetachedLauncher::default();

        let pid = launcher
            .spawn_detached(&format!("touch '{}'", marker.display()))
            .unwrap();
        assert!(pid > 0);

        for _ in 0..100 {
            if marker.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn test_spawn_detached_rejects_empty_command() {
        let launcher = DetachedLauncher::default();
        let err = launcher.spawn_detached("   ").unwrap_err();
        assert!(matches!(err, Error::Process(_)));
    }

    #[tokio::test]
    async fn test_spawn_detached_missing_interpreter() {
        let launcher = DetachedLauncher::new("/nonexistent/flow-shell");
        let err = launcher.spawn_detached("true").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/flow-shell"));
    }

    #[tokio::test]
    async fn test_launch_swallows_spawn_failure() {
        let launcher = DetachedLauncher::new("/nonexistent/flow-shell");
        launcher.launch("true");
    }
}
