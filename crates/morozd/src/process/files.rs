//! Log file handling for the service process.

use std::fs::{File, OpenOptions};
use std::path::Path;

use super::LaunchError;

/// Opens the log file for appending, creating it when absent.
pub(super) fn open_log_file(path: &Path) -> Result<File, LaunchError> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    options.open(path).map_err(|source| LaunchError::LogOpen {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn appends_to_existing_log() {
        let dir = TempDir::new().expect("temporary directory");
        let path = dir.path().join("debug.log");
        fs::write(&path, "first\n").expect("seed log");

        let mut file = open_log_file(&path).expect("open log");
        file.write_all(b"second\n").expect("append");

        assert_eq!(fs::read_to_string(&path).expect("log"), "first\nsecond\n");
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = TempDir::new().expect("temporary directory");
        let path = dir.path().join("absent").join("debug.log");

        let error = open_log_file(&path).expect_err("parent missing");
        assert!(matches!(error, LaunchError::LogOpen { path: reported, .. } if reported == path));
    }
}
