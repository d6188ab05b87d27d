//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::PathBuf;
use std::time::Duration;

use derive_new::new;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, warn};

/// Client for the FRR integrated shell.
///
/// Each query runs `vtysh -c <command>` and captures stdout as the raw
/// bytes handed to the protocol collectors. The client holds no connection
/// state; cloning it is cheap.
#[derive(Clone, Debug, new)]
pub struct Vtysh {
    path: PathBuf,
    sudo: bool,
    timeout: Duration,
}

#[derive(Debug)]
pub enum VtyshError {
    Spawn(std::io::Error),
    Failed(Option<i32>, String),
    Timeout(Duration),
}

// ===== impl Vtysh =====

impl Vtysh {
    /// Runs a single show command, returning its raw output.
    pub async fn show(&self, command: &str) -> Result<Vec<u8>, VtyshError> {
        let mut cmd = if self.sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(&self.path);
            cmd
        } else {
            Command::new(&self.path)
        };
        cmd.arg("-c").arg(command);

        debug!(%command, "querying vtysh");
        let output = time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| VtyshError::Timeout(self.timeout))?
            .map_err(VtyshError::Spawn)?;
        if !output.status.success() {
            let stderr =
                String::from_utf8_lossy(&output.stderr).trim().to_owned();
            return Err(VtyshError::Failed(output.status.code(), stderr));
        }
        Ok(output.stdout)
    }
}

// ===== impl VtyshError =====

impl VtyshError {
    pub fn log(&self) {
        match self {
            VtyshError::Spawn(error) => {
                warn!(%error, "{}", self);
            }
            VtyshError::Failed(code, stderr) => {
                warn!(?code, %stderr, "{}", self);
            }
            VtyshError::Timeout(timeout) => {
                warn!(?timeout, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for VtyshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VtyshError::Spawn(..) => {
                write!(f, "failed to run vtysh")
            }
            VtyshError::Failed(..) => {
                write!(f, "vtysh exited with an error")
            }
            VtyshError::Timeout(..) => {
                write!(f, "vtysh query timed out")
            }
        }
    }
}

impl std::error::Error for VtyshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VtyshError::Spawn(error) => Some(error),
            _ => None,
        }
    }
}

// ===== tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_fails_to_spawn() {
        let vtysh = Vtysh::new(
            PathBuf::from("/nonexistent/vtysh"),
            false,
            Duration::from_secs(5),
        );
        let error = vtysh.show("show version").await.unwrap_err();
        assert!(matches!(error, VtyshError::Spawn(..)));
    }
}
