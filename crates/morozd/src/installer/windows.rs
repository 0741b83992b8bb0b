//! Service Control Manager registry.

use std::ffi::OsString;

use windows_service::service::{
    ServiceAccess, ServiceErrorControl, ServiceInfo, ServiceStartType, ServiceType,
};
use windows_service::service_manager::{ServiceManager, ServiceManagerAccess};

use super::{RegistryError, ServiceDefinition, ServiceRegistry};

const ERROR_SERVICE_DOES_NOT_EXIST: i32 = 1060;
const ERROR_SERVICE_EXISTS: i32 = 1073;

/// Registers services with the local Service Control Manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScmRegistry;

impl ScmRegistry {
    /// Builds a registry for the local machine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn connect(access: ServiceManagerAccess) -> Result<ServiceManager, RegistryError> {
        ServiceManager::local_computer(None::<&str>, access).map_err(|source| {
            RegistryError::Manager {
                operation: "connect",
                source,
            }
        })
    }
}

fn os_error(error: &windows_service::Error) -> Option<i32> {
    match error {
        windows_service::Error::Winapi(source) => source.raw_os_error(),
        _ => None,
    }
}

impl ServiceRegistry for ScmRegistry {
    fn contains(&self, name: &str) -> Result<bool, RegistryError> {
        let manager = Self::connect(ServiceManagerAccess::CONNECT)?;
        match manager.open_service(name, ServiceAccess::QUERY_STATUS) {
            Ok(_service) => Ok(true),
            Err(error) if os_error(&error) == Some(ERROR_SERVICE_DOES_NOT_EXIST) => Ok(false),
            Err(source) => Err(RegistryError::Manager {
                operation: "open service",
                source,
            }),
        }
    }

    fn register(&self, definition: &ServiceDefinition) -> Result<(), RegistryError> {
        let manager =
            Self::connect(ServiceManagerAccess::CONNECT | ServiceManagerAccess::CREATE_SERVICE)?;
        let info = ServiceInfo {
            name: OsString::from(definition.name()),
            display_name: OsString::from(definition.display_name()),
            service_type: ServiceType::OWN_PROCESS,
            start_type: ServiceStartType::OnDemand,
            error_control: ServiceErrorControl::Normal,
            executable_path: definition.executable().to_path_buf(),
            launch_arguments: Vec::new(),
            dependencies: Vec::new(),
            account_name: None,
            account_password: None,
        };
        match manager.create_service(&info, ServiceAccess::QUERY_STATUS) {
            Ok(_service) => Ok(()),
            Err(error) if os_error(&error) == Some(ERROR_SERVICE_EXISTS) => {
                Err(RegistryError::Conflict {
                    name: definition.name().to_owned(),
                })
            }
            Err(source) => Err(RegistryError::Manager {
                operation: "create service",
                source,
            }),
        }
    }
}
