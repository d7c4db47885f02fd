//! External command execution
//!
//! Each shell-out is described as a [`CommandInvocation`] (program, args,
//! working directory) and executed through the [`CommandRunner`] trait.
//! Production uses [`SystemRunner`]; tests substitute a scripted runner that
//! records invocations and returns canned results.

use crate::error::{McpError, McpResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Description of a single external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Program to execute (e.g. "npm")
    pub program: String,
    /// Arguments, one per element
    pub args: Vec<String>,
    /// Working directory for the child process
    pub cwd: PathBuf,
}

impl CommandInvocation {
    /// Create a new invocation
    pub fn new<I, S>(program: &str, args: I, cwd: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.to_path_buf(),
        }
    }

    /// Render the command line for logs and error messages
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured output of a completed command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

/// Executes command invocations
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion, capturing its output
    ///
    /// A non-zero exit status is an error carrying the captured stderr.
    async fn run(&self, invocation: &CommandInvocation) -> McpResult<CommandOutput>;
}

/// Runner backed by real subprocesses via tokio
#[derive(Debug, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &CommandInvocation) -> McpResult<CommandOutput> {
        debug!(
            "⚙️  Running `{}` in {}",
            invocation.command_line(),
            invocation.cwd.display()
        );

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(McpError::Subprocess {
                command: invocation.command_line(),
                status: output.status,
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_renders_program_and_args() {
        let invocation =
            CommandInvocation::new("npm", ["install", "typescript", "--save-dev"], Path::new("/tmp"));
        assert_eq!(invocation.command_line(), "npm install typescript --save-dev");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_captures_stderr_on_failure() {
        let invocation = CommandInvocation::new(
            "sh",
            ["-c", "echo broken >&2; exit 3"],
            Path::new("/tmp"),
        );
        let err = SystemRunner.run(&invocation).await.unwrap_err();
        match err {
            McpError::Subprocess { stderr, .. } => assert!(stderr.contains("broken")),
            other => panic!("expected Subprocess error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_returns_stdout() {
        let invocation = CommandInvocation::new("sh", ["-c", "echo hello"], Path::new("/tmp"));
        let output = SystemRunner.run(&invocation).await.unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }
}
