//! Testable system command execution.
//!
//! The `CommandExecutor` trait is the seam between action execution and the
//! operating system: production code shells out, tests record calls.

use crate::error::{Result, VoicekeyError};
use std::process::Command;

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments.
    ///
    /// Returns the stdout of the command on success.
    /// Returns an error if the command fails or is not found.
    fn execute(&self, command: &str, args: &[&str]) -> Result<String>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

/// Implement CommandExecutor for Arc<E> to allow sharing across threads.
impl<E: CommandExecutor + ?Sized> CommandExecutor for std::sync::Arc<E> {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        (**self).execute(command, args)
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(command).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VoicekeyError::ActionToolNotFound {
                    tool: command.to_string(),
                }
            } else if e.kind() == std::io::ErrorKind::PermissionDenied {
                VoicekeyError::ActionPermissionDenied {
                    message: format!(
                        "Permission denied executing {}: {}.\n\
                        Hint: If using ydotool, ensure the ydotoold daemon is running and you have permissions.\n\
                        Try: sudo systemctl start ydotool",
                        command, e
                    ),
                }
            } else {
                VoicekeyError::ActionFailed {
                    message: format!("Failed to execute {}: {}", command, e),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoicekeyError::ActionFailed {
                message: format!(
                    "{} failed with status {:?}: {}",
                    command, output.status, stderr
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Mock command executor for testing.
///
/// Records all command executions and returns configured responses.
#[derive(Debug, Default)]
pub struct MockCommandExecutor {
    calls: std::sync::Mutex<Vec<(String, Vec<String>)>>,
    responses: std::sync::Mutex<std::collections::VecDeque<Result<String>>>,
}

impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn with_response(self, response: &str) -> Self {
        self.push_response(Ok(response.to_string()));
        self
    }

    /// Queue an error response.
    pub fn with_error(self, error: VoicekeyError) -> Self {
        self.push_response(Err(error));
        self
    }

    fn push_response(&self, response: Result<String>) {
        #[allow(clippy::unwrap_used)]
        self.responses.lock().unwrap().push_back(response);
    }

    /// All recorded calls, in execution order.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        #[allow(clippy::unwrap_used)]
        let calls = self.calls.lock().unwrap();
        calls.clone()
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        #[allow(clippy::unwrap_used)]
        let calls = self.calls.lock().unwrap();
        calls.len()
    }
}

impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        #[allow(clippy::unwrap_used)]
        self.calls.lock().unwrap().push((
            command.to_string(),
            args.iter().map(|s| s.to_string()).collect(),
        ));

        #[allow(clippy::unwrap_used)]
        let mut responses = self.responses.lock().unwrap();
        responses.pop_front().unwrap_or_else(|| Ok(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_records_calls_in_order() {
        let executor = MockCommandExecutor::new();

        executor.execute("ydotool", &["key", "28:1", "28:0"]).unwrap();
        executor.execute("ydotool", &["key", "1:1", "1:0"]).unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "ydotool");
        assert_eq!(calls[0].1, vec!["key", "28:1", "28:0"]);
        assert_eq!(calls[1].1, vec!["key", "1:1", "1:0"]);
    }

    #[test]
    fn mock_returns_queued_responses() {
        let executor = MockCommandExecutor::new()
            .with_response("first")
            .with_error(VoicekeyError::ActionFailed {
                message: "boom".to_string(),
            });

        assert_eq!(executor.execute("tool", &[]).unwrap(), "first");
        assert!(executor.execute("tool", &[]).is_err());
        // Queue exhausted: defaults to empty success
        assert_eq!(executor.execute("tool", &[]).unwrap(), "");
    }

    #[test]
    fn system_executor_maps_missing_tool() {
        let executor = SystemCommandExecutor::new();
        let result = executor.execute("definitely-not-a-real-tool-xyz", &[]);
        match result {
            Err(VoicekeyError::ActionToolNotFound { tool }) => {
                assert_eq!(tool, "definitely-not-a-real-tool-xyz");
            }
            other => panic!("Expected ActionToolNotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn system_executor_captures_stdout() {
        let executor = SystemCommandExecutor::new();
        let output = executor.execute("echo", &["hello"]).unwrap();
        assert_eq!(output.trim(), "hello");
    }

    #[test]
    fn system_executor_reports_nonzero_exit() {
        let executor = SystemCommandExecutor::new();
        let result = executor.execute("false", &[]);
        assert!(matches!(
            result,
            Err(VoicekeyError::ActionFailed { .. })
        ));
    }
}
