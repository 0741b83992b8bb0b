//! Registers `morozd` with the platform service manager.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use moroz_config::{DEFAULT_DISPLAY_NAME, DEFAULT_SERVICE_NAME};
use morozd::installer::{self, InstallError};

const SERVICE_BINARY: &str = "morozd";

#[derive(Debug, Parser)]
#[command(
    name = "moroz-install",
    version,
    about = "Register the Moroz service with the OS service manager"
)]
struct InstallArgs {
    /// Name the service is registered under.
    #[arg(default_value = DEFAULT_SERVICE_NAME)]
    name: String,
    /// Human-readable name shown by service management tools.
    #[arg(default_value = DEFAULT_DISPLAY_NAME)]
    display_name: String,
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_writer(io::stderr)
        .compact()
        .try_init();

    let args = InstallArgs::parse();
    let executable = service_executable();
    let registry = installer::platform_registry();
    let outcome = installer::install(&*registry, &args.name, &args.display_name, &executable);
    let Err(error) = outcome else {
        return ExitCode::SUCCESS;
    };
    let _ = writeln!(io::stderr().lock(), "moroz-install: {error}");
    match error {
        InstallError::AlreadyExists { .. } => ExitCode::from(1),
        InstallError::PathResolution { .. } | InstallError::Registration { .. } => {
            ExitCode::from(2)
        }
    }
}

/// The service binary ships next to the installer.
fn service_executable() -> PathBuf {
    let invoked = env::args_os()
        .next()
        .map_or_else(|| PathBuf::from(SERVICE_BINARY), PathBuf::from);
    invoked.with_file_name(SERVICE_BINARY)
}
