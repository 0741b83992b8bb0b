//! Registers the service executable with the OS service manager.
//!
//! Installation resolves the executable path first, then checks the registry
//! for an existing entry, and only then registers. An existing registration
//! is never touched, so running the installer twice is harmless.

mod path;
#[cfg(unix)]
mod systemd;
#[cfg(windows)]
mod windows;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub use self::path::ExecutablePath;
#[cfg(unix)]
pub use self::systemd::SystemdUnitRegistry;
#[cfg(windows)]
pub use self::windows::ScmRegistry;

const INSTALLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::installer");

/// Everything the service manager needs to launch the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    name: String,
    display_name: String,
    executable: PathBuf,
}

impl ServiceDefinition {
    /// Builds a definition for an already resolved executable.
    #[must_use]
    pub fn new(name: &str, display_name: &str, executable: ExecutablePath) -> Self {
        Self {
            name: name.to_owned(),
            display_name: display_name.to_owned(),
            executable: executable.into_path_buf(),
        }
    }

    /// Name the service is registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable service name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Absolute path of the service executable.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

/// Backend that stores service registrations.
pub trait ServiceRegistry {
    /// Reports whether a service called `name` is already registered.
    fn contains(&self, name: &str) -> Result<bool, RegistryError>;

    /// Registers a new service. Must not replace an existing registration.
    fn register(&self, definition: &ServiceDefinition) -> Result<(), RegistryError>;
}

/// Failures reported by a [`ServiceRegistry`] backend.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A registration with the same name appeared while registering.
    #[error("service {name} is already registered")]
    Conflict {
        /// Conflicting service name.
        name: String,
    },
    /// Reading or writing registration files failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The Service Control Manager refused an operation.
    #[cfg(windows)]
    #[error("service control manager failed to {operation}: {source}")]
    Manager {
        /// Operation that failed.
        operation: &'static str,
        /// Underlying platform error.
        #[source]
        source: windows_service::Error,
    },
}

/// Typed installer failures.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Neither the invoked path nor its extension fallback is a regular file.
    #[error("failed to resolve executable path from {}", path.display())]
    PathResolution {
        /// Path the installer was asked to register.
        path: PathBuf,
    },
    /// A service with this name is already registered; it was left untouched.
    #[error("service {name} already exists")]
    AlreadyExists {
        /// Requested service name.
        name: String,
    },
    /// The registry backend failed.
    #[error("failed to register service {name}: {source}")]
    Registration {
        /// Requested service name.
        name: String,
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
}

/// Registers `executable` as `name` unless that name is already taken.
pub fn install<R>(
    registry: &R,
    name: &str,
    display_name: &str,
    executable: &Path,
) -> Result<ServiceDefinition, InstallError>
where
    R: ServiceRegistry + ?Sized,
{
    let executable = ExecutablePath::resolve(executable)?;
    let registration_failed = |source| InstallError::Registration {
        name: name.to_owned(),
        source,
    };
    if registry.contains(name).map_err(registration_failed)? {
        return Err(InstallError::AlreadyExists {
            name: name.to_owned(),
        });
    }

    let definition = ServiceDefinition::new(name, display_name, executable);
    match registry.register(&definition) {
        Ok(()) => {
            info!(
                target: INSTALLER_TARGET,
                service = name,
                executable = %definition.executable().display(),
                "service registered"
            );
            Ok(definition)
        }
        Err(RegistryError::Conflict { name }) => Err(InstallError::AlreadyExists { name }),
        Err(source) => Err(registration_failed(source)),
    }
}

/// Registry for the platform's service manager.
#[cfg(unix)]
#[must_use]
pub fn platform_registry() -> Box<dyn ServiceRegistry> {
    Box::new(SystemdUnitRegistry::system())
}

/// Registry for the platform's service manager.
#[cfg(windows)]
#[must_use]
pub fn platform_registry() -> Box<dyn ServiceRegistry> {
    Box::new(ScmRegistry::new())
}
