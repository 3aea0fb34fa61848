//! Stage exit states and per-stage results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::ExitStatus;

use super::StageCommand;
use crate::core::{StageKind, StageStatus};
use crate::errors::PgoflowError;

/// How a stage process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExitState {
    /// The process exited with this code.
    Code(i32),
    /// The process was terminated by this signal (unix only).
    Signal(i32),
}

impl ExitState {
    /// Returns true only for exit code zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self, Self::Code(0))
    }

    /// Returns the exit code the driver surfaces for this state.
    ///
    /// Signal terminations follow the shell convention of `128 + signal`.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Code(code) => *code,
            Self::Signal(signal) => 128 + *signal,
        }
    }
}

impl From<ExitStatus> for ExitState {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signal(signal);
            }
        }
        Self::Code(1)
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit code {code}"),
            Self::Signal(signal) => write!(f, "signal {signal}"),
        }
    }
}

/// Result of one stage invocation. Standard streams are not captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage that ran.
    pub stage: StageKind,
    /// Command line, rendered for display.
    pub command: String,
    /// Final status.
    pub status: StageStatus,
    /// How the process exited, when it ran to completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<ExitState>,
    /// Error message if the stage did not succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the stage started.
    pub started_at: DateTime<Utc>,
    /// When the stage ended.
    pub ended_at: DateTime<Utc>,
}

impl StageResult {
    /// Builds the result for a finished runner call.
    #[must_use]
    pub fn from_outcome(
        command: &StageCommand,
        started_at: DateTime<Utc>,
        outcome: &Result<ExitState, PgoflowError>,
    ) -> Self {
        let (status, exit, error) = match outcome {
            Ok(exit) if exit.success() => (StageStatus::Ok, Some(*exit), None),
            Ok(exit) => (StageStatus::Fail, Some(*exit), Some(format!("exited with {exit}"))),
            Err(err @ PgoflowError::Interrupted { .. }) => {
                (StageStatus::Cancel, None, Some(err.to_string()))
            }
            Err(err) => (StageStatus::Fail, None, Some(err.to_string())),
        };

        Self {
            stage: command.stage(),
            command: command.to_string(),
            status,
            exit,
            error,
            started_at,
            ended_at: Utc::now(),
        }
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds() as f64
    }

    /// Returns true if the stage succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::ShutdownSignal;

    fn build_command() -> StageCommand {
        StageCommand::new(StageKind::InstrumentedBuild, "cargo").args(["pgo", "build"])
    }

    #[test]
    fn test_exit_state_codes() {
        assert!(ExitState::Code(0).success());
        assert!(!ExitState::Code(1).success());
        assert!(!ExitState::Signal(9).success());
        assert_eq!(ExitState::Code(42).exit_code(), 42);
        assert_eq!(ExitState::Signal(9).exit_code(), 137);
        assert_eq!(ExitState::Signal(15).to_string(), "signal 15");
    }

    #[test]
    fn test_result_for_success() {
        let result =
            StageResult::from_outcome(&build_command(), Utc::now(), &Ok(ExitState::Code(0)));
        assert!(result.is_success());
        assert_eq!(result.command, "cargo pgo build");
        assert_eq!(result.exit, Some(ExitState::Code(0)));
        assert!(result.error.is_none());
        assert!(result.duration_ms() >= 0.0);
    }

    #[test]
    fn test_result_for_nonzero_exit() {
        let result =
            StageResult::from_outcome(&build_command(), Utc::now(), &Ok(ExitState::Code(101)));
        assert_eq!(result.status, StageStatus::Fail);
        assert_eq!(result.error.as_deref(), Some("exited with exit code 101"));
    }

    #[test]
    fn test_result_for_interrupt_is_cancel() {
        let outcome = Err(PgoflowError::Interrupted {
            stage: StageKind::InstrumentedBuild,
            signal: ShutdownSignal::Terminate,
        });
        let result = StageResult::from_outcome(&build_command(), Utc::now(), &outcome);
        assert_eq!(result.status, StageStatus::Cancel);
        assert!(result.exit.is_none());
    }

    #[test]
    fn test_result_serialization() {
        let result =
            StageResult::from_outcome(&build_command(), Utc::now(), &Ok(ExitState::Code(2)));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["stage"], "instrumented_build");
        assert_eq!(json["status"], "fail");
        assert_eq!(json["exit"]["kind"], "code");
        assert_eq!(json["exit"]["value"], 2);
    }
}
