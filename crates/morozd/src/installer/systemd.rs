//! systemd unit registry.

use std::fs::Permissions;
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::controller::NO_RESTART_EXIT_CODE;

use super::{RegistryError, ServiceDefinition};

const SYSTEM_UNIT_DIR: &str = "/etc/systemd/system";

/// Registers services as unit files in a systemd unit directory.
#[derive(Debug, Clone)]
pub struct SystemdUnitRegistry {
    unit_dir: PathBuf,
}

impl SystemdUnitRegistry {
    /// Registry writing into `unit_dir`.
    #[must_use]
    pub fn new(unit_dir: impl Into<PathBuf>) -> Self {
        Self {
            unit_dir: unit_dir.into(),
        }
    }

    /// Registry for the system-wide unit directory.
    #[must_use]
    pub fn system() -> Self {
        Self::new(SYSTEM_UNIT_DIR)
    }

    /// Path of the unit file for `name`.
    #[must_use]
    pub fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(format!("{name}.service"))
    }

    fn io_error(path: &Path, source: io::Error) -> RegistryError {
        RegistryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl super::ServiceRegistry for SystemdUnitRegistry {
    fn contains(&self, name: &str) -> Result<bool, RegistryError> {
        let path = self.unit_path(name);
        path.try_exists()
            .map_err(|source| Self::io_error(&path, source))
    }

    fn register(&self, definition: &ServiceDefinition) -> Result<(), RegistryError> {
        let path = self.unit_path(definition.name());
        let mut builder = Builder::new();
        builder
            .prefix(".moroz-unit")
            .permissions(Permissions::from_mode(0o644));
        let mut file = builder
            .tempfile_in(&self.unit_dir)
            .map_err(|source| Self::io_error(&self.unit_dir, source))?;
        file.write_all(render_unit(definition).as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .map_err(|source| Self::io_error(file.path(), source))?;
        // Never replaces an existing unit, even one written since the existence check.
        file.persist_noclobber(&path).map_err(|error| {
            if error.error.kind() == io::ErrorKind::AlreadyExists {
                RegistryError::Conflict {
                    name: definition.name().to_owned(),
                }
            } else {
                Self::io_error(&path, error.error)
            }
        })?;
        Ok(())
    }
}

fn render_unit(definition: &ServiceDefinition) -> String {
    let executable = definition.executable();
    let working_dir = executable.parent().unwrap_or_else(|| Path::new("/"));
    format!(
        "[Unit]\n\
         Description={description}\n\
         After=network-online.target\n\
         Wants=network-online.target\n\
         \n\
         [Service]\n\
         Type=simple\n\
         ExecStart=\"{executable}\"\n\
         WorkingDirectory={working_dir}\n\
         Restart=on-failure\n\
         SuccessExitStatus={no_restart}\n\
         RestartPreventExitStatus={no_restart}\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        description = definition.display_name(),
        executable = executable.display(),
        working_dir = working_dir.display(),
        no_restart = NO_RESTART_EXIT_CODE,
    )
}
