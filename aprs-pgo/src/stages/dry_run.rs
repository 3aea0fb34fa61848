//! Runner that only prints what would run.

use async_trait::async_trait;
use std::io::Write;

use super::{ExitState, StageCommand, StageRunner};
use crate::errors::PgoflowError;

/// Prints each command line to stdout and reports success without spawning.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

#[async_trait]
impl StageRunner for DryRunRunner {
    async fn run(&self, command: &StageCommand) -> Result<ExitState, PgoflowError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{command}")?;
        stdout.flush()?;
        Ok(ExitState::Code(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageKind;

    #[tokio::test]
    async fn test_dry_run_always_succeeds() {
        let command = StageCommand::new(StageKind::OptimizedBuild, "/nonexistent/cargo")
            .args(["pgo", "optimize"]);
        let exit = DryRunRunner.run(&command).await.unwrap();
        assert!(exit.success());
    }
}
