//! Scripted stage runners for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;

use crate::core::StageKind;
use crate::errors::PgoflowError;
use crate::stages::{ExitState, StageCommand, StageRunner};

type ErrorFactory = Box<dyn Fn(&StageCommand) -> PgoflowError + Send + Sync>;

/// A runner that records every command and returns scripted outcomes.
///
/// Stages without a scripted outcome exit with code 0.
#[derive(Default)]
pub struct RecordingRunner {
    exits: HashMap<StageKind, ExitState>,
    errors: HashMap<StageKind, ErrorFactory>,
    commands: Mutex<Vec<StageCommand>>,
}

impl RecordingRunner {
    /// Creates a runner where every stage succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `stage` exit with `exit`.
    #[must_use]
    pub fn with_exit(mut self, stage: StageKind, exit: ExitState) -> Self {
        self.exits.insert(stage, exit);
        self
    }

    /// Makes `stage` fail before producing an exit status.
    #[must_use]
    pub fn with_error<F>(mut self, stage: StageKind, factory: F) -> Self
    where
        F: Fn(&StageCommand) -> PgoflowError + Send + Sync + 'static,
    {
        self.errors.insert(stage, Box::new(factory));
        self
    }

    /// Makes `stage` behave as if its program does not exist.
    #[must_use]
    pub fn with_missing(self, stage: StageKind) -> Self {
        self.with_error(stage, |command| PgoflowError::MissingCommand {
            stage: command.stage(),
            program: command.program_name(),
        })
    }

    /// Returns the recorded commands in invocation order.
    #[must_use]
    pub fn commands(&self) -> Vec<StageCommand> {
        self.commands.lock().clone()
    }

    /// Returns the recorded commands rendered as command lines.
    #[must_use]
    pub fn command_lines(&self) -> Vec<String> {
        self.commands.lock().iter().map(ToString::to_string).collect()
    }

    /// Returns the stages invoked, in order.
    #[must_use]
    pub fn stages(&self) -> Vec<StageKind> {
        self.commands.lock().iter().map(StageCommand::stage).collect()
    }

    /// Returns the number of recorded invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.commands.lock().len()
    }
}

impl fmt::Debug for RecordingRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingRunner")
            .field("exits", &self.exits)
            .field("errors", &self.errors.keys().collect::<Vec<_>>())
            .field("calls", &self.call_count())
            .finish()
    }
}

#[async_trait]
impl StageRunner for RecordingRunner {
    async fn run(&self, command: &StageCommand) -> Result<ExitState, PgoflowError> {
        self.commands.lock().push(command.clone());
        if let Some(factory) = self.errors.get(&command.stage()) {
            return Err(factory(command));
        }
        Ok(self
            .exits
            .get(&command.stage())
            .copied()
            .unwrap_or(ExitState::Code(0)))
    }
}
