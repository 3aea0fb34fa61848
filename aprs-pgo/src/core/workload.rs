//! The caller-supplied workload descriptor.

use crate::errors::PgoflowError;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// Path of the file or directory the instrumented binary loads.
///
/// The path is never opened here; it is handed to the profiling run verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkloadDescriptor {
    path: PathBuf,
}

impl WorkloadDescriptor {
    /// Creates a workload descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`PgoflowError::EmptyWorkload`] if `path` is empty.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, PgoflowError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(PgoflowError::EmptyWorkload);
        }
        Ok(Self { path })
    }

    /// Returns the workload path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the workload path as a raw process argument.
    #[must_use]
    pub fn as_os_str(&self) -> &OsStr {
        self.path.as_os_str()
    }
}

impl fmt::Display for WorkloadDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
