//! The record of a single pipeline invocation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::{PipelineState, StageKind, WorkloadDescriptor};
use crate::errors::PgoflowError;
use crate::stages::StageResult;

/// One pipeline invocation: its state, the stages attempted so far, and the
/// error that stopped it, if any.
///
/// A run is created per invocation and never reused.
#[derive(Debug)]
pub struct PipelineRun {
    run_id: Uuid,
    workload: WorkloadDescriptor,
    state: PipelineState,
    results: Vec<StageResult>,
    error: Option<PgoflowError>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    /// Creates a run in the `Start` state.
    #[must_use]
    pub fn new(workload: WorkloadDescriptor) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            workload,
            state: PipelineState::Start,
            results: Vec::new(),
            error: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the workload this run profiles with.
    #[must_use]
    pub const fn workload(&self) -> &WorkloadDescriptor {
        &self.workload
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Returns the results of every stage attempted, in order.
    #[must_use]
    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    /// Returns the stages that were invoked, in order.
    #[must_use]
    pub fn invoked_stages(&self) -> Vec<StageKind> {
        self.results.iter().map(|result| result.stage).collect()
    }

    /// Returns the error that stopped the run.
    #[must_use]
    pub const fn error(&self) -> Option<&PgoflowError> {
        self.error.as_ref()
    }

    /// Returns true once every stage has succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == PipelineState::Done
    }

    /// Returns the process exit code for this run.
    ///
    /// Zero only when all stages succeeded, otherwise the failing stage's
    /// code. A run that never reached a terminal state reports 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match (self.state, &self.error) {
            (PipelineState::Done, _) => 0,
            (_, Some(err)) => err.exit_code(),
            _ => 1,
        }
    }

    /// Returns the wall-clock duration so far in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64
    }

    /// Returns a JSON summary of the run for logging.
    #[must_use]
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "run_id": self.run_id.to_string(),
            "workload": self.workload.to_string(),
            "state": self.state,
            "exit_code": self.exit_code(),
            "duration_ms": self.duration_ms(),
            "stages": self.results,
        })
    }

    pub(crate) fn enter(&mut self, stage: StageKind) {
        while self.state != stage.state() && !self.state.is_terminal() {
            self.state = self.state.advance();
        }
    }

    pub(crate) fn record(&mut self, result: StageResult) {
        self.results.push(result);
    }

    pub(crate) fn finish(&mut self) {
        self.state = self.state.advance();
        self.ended_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, error: PgoflowError) {
        self.state = self.state.fail();
        self.error = Some(error);
        self.ended_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::ExitState;

    fn new_run() -> PipelineRun {
        PipelineRun::new(WorkloadDescriptor::new("/data/sample.mw").unwrap())
    }

    #[test]
    fn test_new_run_starts_empty() {
        let run = new_run();
        assert_eq!(run.state(), PipelineState::Start);
        assert!(run.results().is_empty());
        assert!(run.error().is_none());
        assert!(!run.is_success());
        assert_eq!(run.exit_code(), 1);
    }

    #[test]
    fn test_enter_walks_state_machine() {
        let mut run = new_run();
        run.enter(StageKind::InstrumentedBuild);
        assert_eq!(run.state(), PipelineState::InstrumentedBuild);
        run.enter(StageKind::ProfilingRun);
        assert_eq!(run.state(), PipelineState::ProfilingRun);
        run.enter(StageKind::OptimizedBuild);
        run.finish();
        assert_eq!(run.state(), PipelineState::Done);
        assert_eq!(run.exit_code(), 0);
    }

    #[test]
    fn test_failed_run_reports_stage_code() {
        let mut run = new_run();
        run.enter(StageKind::InstrumentedBuild);
        run.fail(PgoflowError::StageFailed {
            stage: StageKind::InstrumentedBuild,
            exit: ExitState::Code(4),
        });
        assert_eq!(run.state(), PipelineState::Failed);
        assert_eq!(run.exit_code(), 4);

        run.enter(StageKind::ProfilingRun);
        assert_eq!(run.state(), PipelineState::Failed);
    }

    #[test]
    fn test_summary_contains_run_fields() {
        let run = new_run();
        let summary = run.summary();
        assert_eq!(summary["workload"], "/data/sample.mw");
        assert_eq!(summary["state"], "start");
        assert_eq!(summary["stages"], serde_json::json!([]));
    }
}
