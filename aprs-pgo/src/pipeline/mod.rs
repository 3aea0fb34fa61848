//! The stage controller.
//!
//! [`PgoPipeline`] runs the instrumented build, the profiling run and the
//! optimized build in that order, one process at a time, and stops at the
//! first stage that does not succeed.

mod run;

pub use run::PipelineRun;

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};

use crate::config::{PgoConfig, PROFILE_DATA_DIR};
use crate::core::{StageEvent, StageKind, WorkloadDescriptor};
use crate::errors::PgoflowError;
use crate::events::{EventSink, NoOpEventSink};
use crate::stages::{StageResult, StageRunner};

/// Sequences the three PGO stages over a [`StageRunner`].
pub struct PgoPipeline<R> {
    config: PgoConfig,
    runner: R,
    sink: Arc<dyn EventSink>,
}

impl<R: StageRunner> PgoPipeline<R> {
    /// Creates a pipeline that discards lifecycle events.
    #[must_use]
    pub fn new(config: PgoConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs the pipeline against `workload`.
    ///
    /// Never returns early with an error: the failure, if any, is recorded on
    /// the returned run and [`PipelineRun::exit_code`] reflects it.
    pub async fn run(&self, workload: &WorkloadDescriptor) -> PipelineRun {
        let mut run = PipelineRun::new(workload.clone());
        let span = info_span!("pgo_pipeline", run_id = %run.run_id(), workload = %workload);
        self.drive(&mut run).instrument(span).await;
        run
    }

    async fn drive(&self, run: &mut PipelineRun) {
        let run_id = run.run_id().to_string();
        self.sink
            .emit(StageEvent::pipeline_started(&run_id, &run.workload().to_string()))
            .await;

        match self.execute(run).await {
            Ok(()) => {
                run.finish();
                info!(summary = %run.summary(), "pipeline completed");
                self.sink
                    .emit(StageEvent::pipeline_completed(&run_id, run.duration_ms()))
                    .await;
            }
            Err(err) => {
                let exit_code = err.exit_code();
                if err.is_reported_by_child() {
                    info!(error = %err, exit_code, "pipeline stopped");
                } else {
                    error!(exit_code, "{err}");
                }
                run.fail(err);
                debug!(summary = %run.summary(), "pipeline failed");
                self.sink
                    .emit(StageEvent::pipeline_failed(&run_id, exit_code))
                    .await;
            }
        }
    }

    async fn execute(&self, run: &mut PipelineRun) -> Result<(), PgoflowError> {
        self.run_stage(run, StageKind::InstrumentedBuild).await?;
        debug!(profile_dir = PROFILE_DATA_DIR, "profiles are written by the instrumented binary");
        self.run_stage(run, StageKind::ProfilingRun).await?;
        self.run_stage(run, StageKind::OptimizedBuild).await
    }

    async fn run_stage(&self, run: &mut PipelineRun, stage: StageKind) -> Result<(), PgoflowError> {
        let command = self.config.command_for(stage, run.workload());
        let rendered = command.to_string();
        run.enter(stage);
        info!(%stage, command = %rendered, "starting stage");
        self.sink
            .emit(StageEvent::stage_started(stage, &rendered))
            .await;

        let started_at = Utc::now();
        let outcome = self.runner.run(&command).await;
        let result = StageResult::from_outcome(&command, started_at, &outcome);
        let duration_ms = result.duration_ms();
        run.record(result);

        let err = match outcome {
            Ok(exit) if exit.success() => {
                info!(%stage, duration_ms, "stage completed");
                self.sink
                    .emit(StageEvent::stage_completed(stage, duration_ms))
                    .await;
                return Ok(());
            }
            Ok(exit) => PgoflowError::StageFailed { stage, exit },
            Err(err) => err,
        };

        self.sink
            .emit(StageEvent::stage_failed(stage, &err.to_string(), err.exit_code()))
            .await;
        Err(err)
    }
}
