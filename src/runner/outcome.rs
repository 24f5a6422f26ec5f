/// Result of one attempt to run a subprocess.
///
/// A process that never started has no exit code; it is reported as
/// [`ExecutionOutcome::SpawnFailed`] rather than as an exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The process ran to completion. Killed-by-signal maps to `128 + signal`.
    Exited { exit_code: i32, output: Vec<u8> },
    /// The OS could not start the process
    SpawnFailed { message: String },
    /// The wait was cancelled and the process was terminated
    Cancelled { output: Vec<u8> },
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExecutionOutcome::Exited { exit_code: 0, .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecutionOutcome::Exited { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Interleaved stdout and stderr captured so far
    pub fn output(&self) -> &[u8] {
        match self {
            ExecutionOutcome::Exited { output, .. } | ExecutionOutcome::Cancelled { output } => {
                output
            }
            ExecutionOutcome::SpawnFailed { .. } => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::SpawnFailed { message } => Some(message),
            ExecutionOutcome::Cancelled { .. } => Some("command cancelled"),
            ExecutionOutcome::Exited { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecutionOutcome::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_zero_exit() {
        let outcome = ExecutionOutcome::Exited {
            exit_code: 3,
            output: b"boom".to_vec(),
        };
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code(), Some(3));
        assert_eq!(outcome.output(), b"boom");
        assert_eq!(outcome.error_message(), None);
    }

    #[test]
    fn test_spawn_failure_has_no_exit_code() {
        let outcome = ExecutionOutcome::SpawnFailed {
            message: "No such file or directory (os error 2)".to_string(),
        };
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code(), None);
        assert!(outcome.output().is_empty());
        assert!(outcome.error_message().is_some());
    }
}
