//! # aprs-pgo
//!
//! Profile-guided optimization build driver for the `aprs` server.
//!
//! A PGO build is three external processes run strictly in order:
//!
//! - **Instrumented build**: `cargo pgo build`
//! - **Profiling run**: `target/<host>/release/aprs --only-load <workload>`
//! - **Optimized build**: `cargo pgo optimize`
//!
//! The first stage that fails stops the pipeline and its exit code becomes
//! the driver's exit code. Stage output streams straight through to the
//! terminal.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aprs_pgo::prelude::*;
//!
//! let workload = WorkloadDescriptor::new("/data/sample.mw")?;
//! let pipeline = PgoPipeline::new(PgoConfig::default(), ProcessRunner::new());
//! let run = pipeline.run(&workload).await;
//! std::process::exit(run.exit_code());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{PgoConfig, ONLY_LOAD_FLAG, PROFILE_DATA_DIR};
    pub use crate::core::{PipelineState, StageEvent, StageKind, StageStatus, WorkloadDescriptor};
    pub use crate::errors::PgoflowError;
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{PgoPipeline, PipelineRun};
    pub use crate::stages::{
        DryRunRunner, ExitState, ProcessRunner, StageCommand, StageResult, StageRunner,
    };
}
