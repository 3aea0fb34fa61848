//! Command-line wiring for the PGO driver.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

use crate::config::PgoConfig;
use crate::core::WorkloadDescriptor;
use crate::events::LoggingEventSink;
use crate::observability::{init_tracing, LogFormat};
use crate::pipeline::PgoPipeline;
use crate::stages::{DryRunRunner, ProcessRunner, StageRunner};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "aprs-pgo",
    about = "Build a profile-guided optimized aprs binary",
    long_about = "Runs `cargo pgo build`, profiles the instrumented aprs binary with \
                  `--only-load <WORKLOAD_PATH>`, then runs `cargo pgo optimize`. \
                  Stops at the first failing step and exits with its code."
)]
pub struct Cli {
    /// Multiworld file or directory the instrumented binary loads while profiling.
    pub workload_path: PathBuf,

    /// Build tool invoked for the instrumented and optimized builds.
    #[arg(long, default_value = "cargo")]
    pub build_tool: PathBuf,

    /// Instrumented binary to profile [default: target/<host>/release/aprs].
    #[arg(long)]
    pub target_binary: Option<PathBuf>,

    /// Print the three commands without running them.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Format of diagnostics written to stderr.
    #[arg(long, value_enum, default_value = "pretty")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Builds the pipeline configuration from the flags.
    #[must_use]
    pub fn config(&self) -> PgoConfig {
        let config = PgoConfig::new().with_build_tool(&self.build_tool);
        match &self.target_binary {
            Some(target_binary) => config.with_target_binary(target_binary),
            None => config,
        }
    }
}

/// Runs the CLI and returns the process exit code.
pub fn run_cli(cli: Cli) -> Result<ExitCode> {
    init_tracing(cli.log_format);

    let workload = WorkloadDescriptor::new(&cli.workload_path)?;
    let config = cli.config();
    debug!(?config, dry_run = cli.dry_run, "configuration");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let code = if cli.dry_run {
        runtime.block_on(run_pipeline(config, DryRunRunner, &workload))
    } else {
        runtime.block_on(run_pipeline(config, ProcessRunner::new(), &workload))
    };
    Ok(to_exit_code(code))
}

async fn run_pipeline<R: StageRunner>(
    config: PgoConfig,
    runner: R,
    workload: &WorkloadDescriptor,
) -> i32 {
    PgoPipeline::new(config, runner)
        .with_event_sink(Arc::new(LoggingEventSink::debug()))
        .run(workload)
        .await
        .exit_code()
}

/// Converts a pipeline exit code into a process exit code.
#[must_use]
pub fn to_exit_code(code: i32) -> ExitCode {
    ExitCode::from(exit_status_byte(code))
}

/// Narrows an exit code to the byte a process can report.
///
/// Codes outside `0..=255` become 1 so a failure never reads as success.
#[must_use]
pub fn exit_status_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_positional_argument() {
        let cli = Cli::try_parse_from(["aprs-pgo", "/data/sample.mw"]).unwrap();
        assert_eq!(cli.workload_path, PathBuf::from("/data/sample.mw"));
        assert!(!cli.dry_run);
        assert_eq!(cli.log_format, LogFormat::Pretty);
        assert_eq!(cli.config(), PgoConfig::default());
    }

    #[test]
    fn test_workload_path_is_required() {
        assert!(Cli::try_parse_from(["aprs-pgo"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "aprs-pgo",
            "--build-tool",
            "/opt/cargo",
            "--target-binary",
            "bin/aprs",
            "--log-format",
            "json",
            "world.zip",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.build_tool, PathBuf::from("/opt/cargo"));
        assert_eq!(config.target_binary, PathBuf::from("bin/aprs"));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_exit_code_conversion() {
        assert_eq!(exit_status_byte(0), 0);
        assert_eq!(exit_status_byte(3), 3);
        assert_eq!(exit_status_byte(143), 143);
        assert_eq!(exit_status_byte(256), 1);
        assert_eq!(exit_status_byte(-1), 1);
    }
}
