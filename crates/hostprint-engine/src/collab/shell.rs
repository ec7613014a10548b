//! Shell command executor

use std::process::Command;

use super::{CollaboratorError, CommandExecutor};

/// Runs commands through `sh -c` and captures stdout
#[derive(Debug, Clone)]
pub struct ShellCommandExecutor {
    shell: String,
}

impl ShellCommandExecutor {
    /// Executor using `sh`
    pub fn new() -> Self {
        Self::with_shell("sh")
    }

    /// Executor using another POSIX shell
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self { shell: shell.into() }
    }
}

impl Default for ShellCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for ShellCommandExecutor {
    fn execute(&self, command: &str) -> Result<Vec<String>, CollaboratorError> {
        let output = Command::new(&self.shell).arg("-c").arg(command).output()?;
        if !output.status.success() && output.stdout.is_empty() {
            return Err(CollaboratorError::CommandFailed {
                command: command.to_string(),
                reason: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }
}
