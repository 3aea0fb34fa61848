//! Configuration for the PGO pipeline.
//!
//! Defaults follow the `cargo pgo` workflow for the `aprs` server binary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::{StageKind, WorkloadDescriptor};
use crate::stages::StageCommand;

/// Flag telling the instrumented binary to load the workload and exit.
pub const ONLY_LOAD_FLAG: &str = "--only-load";

/// Where the instrumented binary writes profiles and the optimize pass reads
/// them.
///
/// This location belongs to the build tool. The pipeline never reads or
/// writes it and passes no path to the optimize pass.
pub const PROFILE_DATA_DIR: &str = "target/pgo-profiles";

/// Name of the binary being optimized.
pub const TARGET_BINARY_NAME: &str = "aprs";

/// Configuration for the three pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgoConfig {
    /// Build tool program invoked for both build stages.
    #[serde(default = "default_build_tool")]
    pub build_tool: PathBuf,
    /// Arguments for the instrumented build.
    #[serde(default = "default_instrument_args")]
    pub instrument_args: Vec<String>,
    /// Arguments for the optimized build.
    #[serde(default = "default_optimize_args")]
    pub optimize_args: Vec<String>,
    /// Instrumented binary run during profiling.
    #[serde(default = "default_target_binary")]
    pub target_binary: PathBuf,
    /// Flag passed ahead of the workload path.
    #[serde(default = "default_only_load_flag")]
    pub only_load_flag: String,
}

fn default_build_tool() -> PathBuf {
    PathBuf::from("cargo")
}

fn default_instrument_args() -> Vec<String> {
    vec!["pgo".to_string(), "build".to_string()]
}

fn default_optimize_args() -> Vec<String> {
    vec!["pgo".to_string(), "optimize".to_string()]
}

/// Returns `target/<host-triple>/release/aprs`, where the instrumented build
/// leaves the binary.
#[must_use]
pub fn default_target_binary() -> PathBuf {
    let mut path = PathBuf::from("target");
    let triple = env!("APRS_PGO_HOST_TRIPLE");
    if !triple.is_empty() {
        path.push(triple);
    }
    path.push("release");
    path.push(format!(
        "{TARGET_BINARY_NAME}{}",
        std::env::consts::EXE_SUFFIX
    ));
    path
}

fn default_only_load_flag() -> String {
    ONLY_LOAD_FLAG.to_string()
}

impl Default for PgoConfig {
    fn default() -> Self {
        Self {
            build_tool: default_build_tool(),
            instrument_args: default_instrument_args(),
            optimize_args: default_optimize_args(),
            target_binary: default_target_binary(),
            only_load_flag: default_only_load_flag(),
        }
    }
}

impl PgoConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the build tool.
    #[must_use]
    pub fn with_build_tool(mut self, build_tool: impl Into<PathBuf>) -> Self {
        self.build_tool = build_tool.into();
        self
    }

    /// Sets the instrumented binary.
    #[must_use]
    pub fn with_target_binary(mut self, target_binary: impl Into<PathBuf>) -> Self {
        self.target_binary = target_binary.into();
        self
    }

    /// Builds the command for `stage`.
    ///
    /// Only the profiling run sees the workload; the optimize pass finds the
    /// profiles through [`PROFILE_DATA_DIR`] on its own.
    #[must_use]
    pub fn command_for(&self, stage: StageKind, workload: &WorkloadDescriptor) -> StageCommand {
        match stage {
            StageKind::InstrumentedBuild => {
                StageCommand::new(stage, &self.build_tool).args(&self.instrument_args)
            }
            StageKind::ProfilingRun => StageCommand::new(stage, &self.target_binary)
                .arg(&self.only_load_flag)
                .arg(workload.as_os_str()),
            StageKind::OptimizedBuild => {
                StageCommand::new(stage, &self.build_tool).args(&self.optimize_args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn workload() -> WorkloadDescriptor {
        WorkloadDescriptor::new("/data/sample.mw").unwrap()
    }

    #[test]
    fn test_default_commands() {
        let config = PgoConfig::default();
        assert_eq!(
            config.command_for(StageKind::InstrumentedBuild, &workload()).to_string(),
            "cargo pgo build"
        );
        assert_eq!(
            config.command_for(StageKind::OptimizedBuild, &workload()).to_string(),
            "cargo pgo optimize"
        );
    }

    #[test]
    fn test_profiling_run_gets_flag_then_workload() {
        let config = PgoConfig::new().with_target_binary("bin/aprs");
        let command = config.command_for(StageKind::ProfilingRun, &workload());
        assert_eq!(command.program(), std::path::Path::new("bin/aprs"));
        assert_eq!(
            command.get_args(),
            &[OsString::from("--only-load"), OsString::from("/data/sample.mw")]
        );
    }

    #[test]
    fn test_default_target_binary_is_release_aprs() {
        let path = default_target_binary();
        assert!(path.starts_with("target"));
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with(TARGET_BINARY_NAME));
        assert_eq!(
            path.parent().and_then(|p| p.file_name()),
            Some(std::ffi::OsStr::new("release"))
        );
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: PgoConfig =
            serde_json::from_str(r#"{"build_tool": "/opt/cargo/bin/cargo"}"#).unwrap();
        assert_eq!(config.build_tool, PathBuf::from("/opt/cargo/bin/cargo"));
        assert_eq!(config.instrument_args, vec!["pgo", "build"]);
        assert_eq!(config.only_load_flag, ONLY_LOAD_FLAG);
    }
}
