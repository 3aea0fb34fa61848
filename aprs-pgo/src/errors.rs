//! Error types for the PGO build driver.
//!
//! Every variant that carries a [`StageKind`] is a stage failure: the
//! pipeline stops at the stage that produced it and the process exits with
//! the code returned by [`PgoflowError::exit_code`].

use crate::core::StageKind;
use crate::stages::{ExitState, ShutdownSignal};
use thiserror::Error;

/// Exit code used when the workload argument is unusable.
pub const USAGE_EXIT_CODE: i32 = 2;

/// Exit code used when a stage program does not exist (matches POSIX shells).
pub const MISSING_COMMAND_EXIT_CODE: i32 = 127;

/// Exit code used when a stage program exists but could not be started.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 126;

/// The main error type for PGO pipeline operations.
#[derive(Debug, Error)]
pub enum PgoflowError {
    /// The workload path was empty.
    #[error("workload path must not be empty")]
    EmptyWorkload,

    /// The program for a stage could not be found.
    #[error("missing required command: {program}")]
    MissingCommand {
        /// Stage that tried to spawn the program.
        stage: StageKind,
        /// Program as configured.
        program: String,
    },

    /// The program for a stage was found but failed to start.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Stage that tried to spawn the program.
        stage: StageKind,
        /// Program as configured.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The stage process ran and did not exit successfully.
    #[error("{stage} failed: {exit}")]
    StageFailed {
        /// Stage that failed.
        stage: StageKind,
        /// How the process exited.
        exit: ExitState,
    },

    /// A termination signal arrived while the stage was running.
    #[error("{stage} interrupted by {signal}")]
    Interrupted {
        /// Stage whose process was killed.
        stage: StageKind,
        /// Signal received by the driver.
        signal: ShutdownSignal,
    },

    /// IO error while waiting on a stage process.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PgoflowError {
    /// Returns the process exit code this error surfaces as.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::EmptyWorkload => USAGE_EXIT_CODE,
            Self::MissingCommand { .. } => MISSING_COMMAND_EXIT_CODE,
            Self::Spawn { .. } => SPAWN_FAILURE_EXIT_CODE,
            Self::StageFailed { exit, .. } => exit.exit_code(),
            Self::Interrupted { signal, .. } => signal.exit_code(),
            Self::Io(_) => 1,
        }
    }

    /// Returns true if the stage process ran and exited unsuccessfully.
    ///
    /// The child has already written its own diagnostics in that case.
    #[must_use]
    pub fn is_reported_by_child(&self) -> bool {
        matches!(self, Self::StageFailed { .. })
    }
}
