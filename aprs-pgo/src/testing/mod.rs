//! Testing utilities.
//!
//! Provides a scripted [`StageRunner`](crate::stages::StageRunner) so the
//! pipeline can be exercised without spawning processes.

mod mocks;

pub use mocks::RecordingRunner;
