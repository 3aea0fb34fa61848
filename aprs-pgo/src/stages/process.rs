//! Runner that spawns real processes.

use async_trait::async_trait;
use std::io;
use tracing::{debug, warn};

use super::{ExitState, ShutdownSignal, StageCommand, StageRunner};
use crate::errors::PgoflowError;

/// Spawns each stage as a child process and waits for it.
///
/// Standard streams are inherited, so the child's output reaches the user
/// unmodified. A SIGINT or SIGTERM received while the child runs kills the
/// child before the error is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Creates a new process runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StageRunner for ProcessRunner {
    async fn run(&self, command: &StageCommand) -> Result<ExitState, PgoflowError> {
        let mut child = command
            .to_command()
            .spawn()
            .map_err(|err| spawn_error(command, err))?;
        debug!(stage = %command.stage(), pid = ?child.id(), "spawned stage process");

        tokio::select! {
            status = child.wait() => Ok(ExitState::from(status?)),
            signal = ShutdownSignal::recv() => {
                warn!(stage = %command.stage(), %signal, "terminating running stage");
                if let Err(err) = child.start_kill() {
                    debug!(error = %err, "stage process already exited");
                }
                child.wait().await?;
                Err(PgoflowError::Interrupted {
                    stage: command.stage(),
                    signal,
                })
            }
        }
    }
}

fn spawn_error(command: &StageCommand, err: io::Error) -> PgoflowError {
    match err.kind() {
        io::ErrorKind::NotFound => PgoflowError::MissingCommand {
            stage: command.stage(),
            program: command.program_name(),
        },
        _ => PgoflowError::Spawn {
            stage: command.stage(),
            program: command.program_name(),
            source: err,
        },
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::StageKind;
    use std::time::{Duration, Instant};
    use tokio::signal::unix::{signal, SignalKind};
    use tokio::sync::Mutex;

    // SIGTERM goes to the whole test process, so runners must not overlap it.
    static SIGNAL_LOCK: Mutex<()> = Mutex::const_new(());

    fn shell(script: &str) -> StageCommand {
        StageCommand::new(StageKind::ProfilingRun, "sh").args(["-c", script])
    }

    #[tokio::test]
    async fn test_successful_process() {
        let _serial = SIGNAL_LOCK.lock().await;
        let exit = ProcessRunner::new().run(&shell("exit 0")).await.unwrap();
        assert_eq!(exit, ExitState::Code(0));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_raised() {
        let _serial = SIGNAL_LOCK.lock().await;
        let exit = ProcessRunner::new().run(&shell("exit 3")).await.unwrap();
        assert_eq!(exit, ExitState::Code(3));
        assert_eq!(exit.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_signal_termination() {
        let _serial = SIGNAL_LOCK.lock().await;
        let exit = ProcessRunner::new()
            .run(&shell("kill -9 $$"))
            .await
            .unwrap();
        assert_eq!(exit, ExitState::Signal(9));
        assert_eq!(exit.exit_code(), 137);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let _serial = SIGNAL_LOCK.lock().await;
        let command = StageCommand::new(
            StageKind::InstrumentedBuild,
            "/nonexistent/aprs-pgo-test/cargo",
        )
        .args(["pgo", "build"]);
        let err = ProcessRunner::new().run(&command).await.unwrap_err();
        assert!(matches!(
            err,
            PgoflowError::MissingCommand {
                stage: StageKind::InstrumentedBuild,
                ..
            }
        ));
        assert_eq!(err.exit_code(), 127);
    }

    #[tokio::test]
    async fn test_arguments_reach_the_child() {
        let _serial = SIGNAL_LOCK.lock().await;
        let command = StageCommand::new(StageKind::ProfilingRun, "sh")
            .args(["-c", r#"[ "$1" = "--only-load" ] && [ "$2" = "/data/with space.mw" ]"#])
            .args(["sh", "--only-load", "/data/with space.mw"]);
        let exit = ProcessRunner::new().run(&command).await.unwrap();
        assert!(exit.success());
    }

    #[tokio::test]
    async fn test_terminate_kills_running_stage() {
        let _serial = SIGNAL_LOCK.lock().await;
        let _handler = signal(SignalKind::terminate()).unwrap();
        let pid = std::process::id().to_string();
        let sender = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            tokio::process::Command::new("kill")
                .args(["-TERM", &pid])
                .status()
                .await
        });

        let started = Instant::now();
        let err = ProcessRunner::new()
            .run(&shell("sleep 5"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PgoflowError::Interrupted {
                stage: StageKind::ProfilingRun,
                signal: ShutdownSignal::Terminate,
            }
        ));
        assert_eq!(err.exit_code(), 143);
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(sender.await.unwrap().unwrap().success());
    }
}
