//! External command execution.
//!
//! The reconciler never spawns processes itself. It goes through a
//! [`CommandRunner`], so tests can script `svccfg` output with
//! [`crate::testing::MockRunner`] and production code uses [`SystemRunner`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SmfError;

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Exit status, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run with the given exit status and stderr.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the command exited with status 0.
    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Capability to run an external command to completion.
///
/// Implementations return `Ok` for any command that ran, whatever its exit
/// status; callers decide what a non-zero status means. `Err` is reserved
/// for commands that could not be run at all.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv[0]` with the remaining arguments and wait for it.
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, SmfError>;
}

#[async_trait::async_trait]
impl<R: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<R> {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, SmfError> {
        (**self).run(argv).await
    }
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, SmfError> {
        let command = argv.join(" ");
        let (program, args) = argv.split_first().ok_or_else(|| SmfError::Spawn {
            command: command.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
        })?;

        debug!(command = %command, "Running command");
        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|source| SmfError::Spawn {
                command: command.clone(),
                source,
            })?;

        let output = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(command = %command, status = ?output.status, "Command finished");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_output_constructors() {
        let out = CommandOutput::success("mypg/myprop astring myvalue");
        assert!(out.is_success());
        assert_eq!(out.stdout, "mypg/myprop astring myvalue");

        let out = CommandOutput::failure(1, "boom");
        assert!(!out.is_success());
        assert_eq!(out.stderr, "boom");

        let out = CommandOutput {
            status: None,
            ..Default::default()
        };
        assert!(!out.is_success());
    }

    #[tokio::test]
    async fn test_empty_argv_is_spawn_error() {
        let err = SystemRunner::new().run(&[]).await.unwrap_err();
        assert!(matches!(err, SmfError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let err = SystemRunner::new()
            .run(&argv(&["/nonexistent/smf-property-test-binary"]))
            .await
            .unwrap_err();
        match err {
            SmfError::Spawn { command, source } => {
                assert_eq!(command, "/nonexistent/smf-property-test-binary");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_captures_output() {
        let out = SystemRunner::new()
            .run(&argv(&["sh", "-c", "echo out; echo err >&2; exit 3"]))
            .await
            .unwrap();
        assert_eq!(out.status, Some(3));
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }
}
