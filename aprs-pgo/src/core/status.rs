//! Stage kind, stage status and pipeline state enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three stages of a PGO build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Build the binary with profiling instrumentation.
    InstrumentedBuild,
    /// Run the instrumented binary against the workload to emit profiles.
    ProfilingRun,
    /// Rebuild the binary using the collected profiles.
    OptimizedBuild,
}

impl StageKind {
    /// All stages in the order they run.
    pub const ALL: [Self; 3] = [
        Self::InstrumentedBuild,
        Self::ProfilingRun,
        Self::OptimizedBuild,
    ];

    /// Returns the pipeline state entered while this stage runs.
    #[must_use]
    pub const fn state(self) -> PipelineState {
        match self {
            Self::InstrumentedBuild => PipelineState::InstrumentedBuild,
            Self::ProfilingRun => PipelineState::ProfilingRun,
            Self::OptimizedBuild => PipelineState::OptimizedBuild,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstrumentedBuild => write!(f, "instrumented-build"),
            Self::ProfilingRun => write!(f, "profiling-run"),
            Self::OptimizedBuild => write!(f, "optimized-build"),
        }
    }
}

/// The outcome status of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage process exited successfully.
    Ok,
    /// Stage process failed to spawn or exited unsuccessfully.
    Fail,
    /// Stage process was killed because the driver was signalled.
    Cancel,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Fail => write!(f, "fail"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

impl StageStatus {
    /// Returns true if the status indicates success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Lifecycle state of one pipeline run.
///
/// `Start -> InstrumentedBuild -> ProfilingRun -> OptimizedBuild -> Done`,
/// with an edge from every non-terminal state to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Nothing has run yet.
    Start,
    /// Stage 1 is running.
    InstrumentedBuild,
    /// Stage 2 is running.
    ProfilingRun,
    /// Stage 3 is running.
    OptimizedBuild,
    /// All stages succeeded.
    Done,
    /// A stage failed; no further stage runs.
    Failed,
}

impl PipelineState {
    /// Returns the state reached after the current one succeeds.
    ///
    /// Terminal states are fixed points.
    #[must_use]
    pub const fn advance(self) -> Self {
        match self {
            Self::Start => Self::InstrumentedBuild,
            Self::InstrumentedBuild => Self::ProfilingRun,
            Self::ProfilingRun => Self::OptimizedBuild,
            Self::OptimizedBuild | Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }

    /// Returns the state reached after the current one fails.
    #[must_use]
    pub const fn fail(self) -> Self {
        match self {
            Self::Done => Self::Done,
            _ => Self::Failed,
        }
    }

    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns the stage running in this state, if any.
    #[must_use]
    pub const fn stage(self) -> Option<StageKind> {
        match self {
            Self::InstrumentedBuild => Some(StageKind::InstrumentedBuild),
            Self::ProfilingRun => Some(StageKind::ProfilingRun),
            Self::OptimizedBuild => Some(StageKind::OptimizedBuild),
            Self::Start | Self::Done | Self::Failed => None,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage() {
            Some(stage) => write!(f, "{stage}"),
            None => match self {
                Self::Start => write!(f, "start"),
                Self::Done => write!(f, "done"),
                _ => write!(f, "failed"),
            },
        }
    }
}
