//! Running the wrapped command.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::CommandError;

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = "bash";

/// How the wrapped command finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Exited with status 0.
    Succeeded,

    /// Exited non-zero. `code` is `None` when a signal killed the process.
    Failed { code: Option<i32> },

    /// Could not be started or waited on.
    LaunchFailed(String),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Build from a process exit code (`None` for signal termination).
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => Self::Succeeded,
            code => Self::Failed { code },
        }
    }
}

/// Runs a command string to completion.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str) -> Result<CommandOutcome, CommandError>;
}

/// Runs commands through `<shell> -c`, sharing this process's stdin,
/// stdout and stderr with the child.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command: &str) -> Result<CommandOutcome, CommandError> {
        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                shell: self.shell.clone(),
                source,
            })?;

        debug!(shell = %self.shell, pid = ?child.id(), "command started");

        let status = child.wait().await.map_err(CommandError::Wait)?;
        Ok(CommandOutcome::from_code(status.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_code() {
        assert_eq!(CommandOutcome::from_code(Some(0)), CommandOutcome::Succeeded);
        assert_eq!(
            CommandOutcome::from_code(Some(2)),
            CommandOutcome::Failed { code: Some(2) }
        );
        assert_eq!(
            CommandOutcome::from_code(None),
            CommandOutcome::Failed { code: None }
        );
    }

    #[tokio::test]
    async fn test_shell_success() {
        let executor = ShellExecutor::new("sh");
        let outcome = executor.execute("true && test 1 -eq 1").await.unwrap();
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_shell_failure_code() {
        let executor = ShellExecutor::new("sh");
        let outcome = executor.execute("exit 7").await.unwrap();
        assert_eq!(outcome, CommandOutcome::Failed { code: Some(7) });
    }

    #[tokio::test]
    async fn test_missing_shell() {
        let executor = ShellExecutor::new("/nonexistent/shell");
        let err = executor.execute("true").await.unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    fn test_default_shell() {
        assert_eq!(ShellExecutor::default().shell(), "bash");
    }
}
