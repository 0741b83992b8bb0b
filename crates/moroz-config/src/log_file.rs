//! Resolves the service log file location.
//!
//! Services are frequently started with an unexpected working directory, so
//! the configured (usually relative) log path is anchored to an explicit
//! directory before anything is opened. Creating the parent directory is
//! optional and controlled by [`Config::create_log_directory`].

use std::fs::DirBuilder;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::Config;

/// Absolute location of the service log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilePath {
    path: PathBuf,
}

impl LogFilePath {
    /// Anchors the configured log file under `working_dir` and, when enabled,
    /// creates its parent directory.
    pub fn resolve(config: &Config, working_dir: &Path) -> Result<Self, LogFileError> {
        let configured = config.log_file();
        if configured.as_str().is_empty() {
            return Err(LogFileError::Empty);
        }
        let path = working_dir.join(configured.as_std_path());
        if config.create_log_directory {
            create_parent(&path)?;
        }
        Ok(Self { path })
    }

    /// Path of the log file.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        self.path.as_path()
    }
}

fn create_parent(path: &Path) -> Result<(), LogFileError> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) else {
        return Ok(());
    };

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    // Recursive creation already accepts an existing directory; an
    // `AlreadyExists` error here means a non-directory is in the way.
    builder
        .create(parent)
        .map_err(|source| LogFileError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })
}

/// Errors raised while resolving the log file location.
#[derive(Debug, Error)]
pub enum LogFileError {
    /// The configured log file path was empty.
    #[error("log file path must not be empty")]
    Empty,
    /// Creating the log directory failed.
    #[error("failed to create log directory '{path}': {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
