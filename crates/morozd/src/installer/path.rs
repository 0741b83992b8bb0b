//! Resolution of the executable path handed to the service manager.

use std::env;
use std::fs;
use std::path::{self, Path, PathBuf};

use super::InstallError;

/// Absolute path to an existing regular file that the service manager will
/// launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutablePath(PathBuf);

impl ExecutablePath {
    /// Resolves `invoked` against the working directory.
    ///
    /// When the candidate is missing and has no extension, the platform's
    /// executable extension is tried before giving up.
    pub fn resolve(invoked: &Path) -> Result<Self, InstallError> {
        Self::resolve_with_extension(invoked, env::consts::EXE_EXTENSION)
    }

    pub(crate) fn resolve_with_extension(
        invoked: &Path,
        extension: &str,
    ) -> Result<Self, InstallError> {
        let failed = || InstallError::PathResolution {
            path: invoked.to_path_buf(),
        };
        let candidate = path::absolute(invoked).map_err(|_| failed())?;
        if is_regular_file(&candidate) {
            return Ok(Self(candidate));
        }
        if candidate.extension().is_none() && !extension.is_empty() {
            let extended = candidate.with_extension(extension);
            if is_regular_file(&extended) {
                return Ok(Self(extended));
            }
        }
        Err(failed())
    }

    /// Resolved path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Consumes the wrapper.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|metadata| metadata.is_file())
}
