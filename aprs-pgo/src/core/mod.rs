//! Core domain model types.
//!
//! This module contains the fundamental types used throughout the driver:
//! - Stage kind, stage status and pipeline state enums
//! - The workload descriptor
//! - Lifecycle events

mod event;
mod status;
mod workload;

pub use event::StageEvent;
pub use status::{PipelineState, StageKind, StageStatus};
pub use workload::WorkloadDescriptor;
