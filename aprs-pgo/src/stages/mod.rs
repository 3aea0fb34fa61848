//! Stage commands and the runners that execute them.
//!
//! A [`StageRunner`] spawns exactly one process per call and waits for it.
//! The pipeline never talks to processes directly; it goes through this seam
//! so the same sequencing drives real builds, dry runs and tests.

mod dry_run;
mod process;
mod result;
mod signal;

pub use dry_run::DryRunRunner;
pub use process::ProcessRunner;
pub use result::{ExitState, StageResult};
pub use signal::ShutdownSignal;

use crate::core::StageKind;
use crate::errors::PgoflowError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// One external process invocation belonging to a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    stage: StageKind,
    program: PathBuf,
    args: Vec<OsString>,
}

impl StageCommand {
    /// Creates a command with no arguments.
    #[must_use]
    pub fn new(stage: StageKind, program: impl Into<PathBuf>) -> Self {
        Self {
            stage,
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns the stage this command belongs to.
    #[must_use]
    pub const fn stage(&self) -> StageKind {
        self.stage
    }

    /// Returns the program to spawn.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the arguments passed to the program.
    #[must_use]
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Returns the program name for diagnostics.
    #[must_use]
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Builds the process with inherited standard streams.
    ///
    /// The child is killed if the returned handle is dropped before it exits.
    #[must_use]
    pub fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        command
    }
}

impl fmt::Display for StageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Executes stage commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StageRunner: Send + Sync {
    /// Runs the command to completion and reports how it exited.
    ///
    /// Returns `Err` only when no exit status could be obtained: the program
    /// could not be spawned, waiting failed, or the driver was signalled.
    async fn run(&self, command: &StageCommand) -> Result<ExitState, PgoflowError>;
}
