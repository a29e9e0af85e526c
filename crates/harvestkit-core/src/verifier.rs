//! Post-upload install verification in a throwaway virtual environment

use crate::config::RegistryConfig;
use crate::error::VerifyError;
use crate::process;
use crate::uploader::RegistryTarget;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug)]
pub struct InstallVerifier {
    python: PathBuf,
    package: String,
    console_command: String,
    registry: RegistryConfig,
}

impl InstallVerifier {
    pub fn new(
        python: PathBuf,
        package: String,
        console_command: String,
        registry: RegistryConfig,
    ) -> Self {
        Self {
            python,
            package,
            console_command,
            registry,
        }
    }

    fn venv_bin(venv: &Path, tool: &str) -> PathBuf {
        venv.join("bin").join(tool)
    }

    /// Install the published package from the chosen index into a fresh
    /// venv, then probe import and the console entry point. The venv lives
    /// in a temp directory and is removed when verification finishes.
    pub async fn verify(&self, target: RegistryTarget) -> Result<(), VerifyError> {
        info!("Verifying installation from {target}");

        let scratch = tempfile::tempdir()?;
        let venv = scratch.path().join("venv");
        let venv_str = venv.to_string_lossy().into_owned();

        let code =
            process::run_quiet(&self.python, &["-m", "venv", &venv_str], None).await?;
        if code != Some(0) {
            return Err(VerifyError::VenvFailed(code));
        }
        debug!("Created venv at {}", venv.display());

        let pip = Self::venv_bin(&venv, "pip");
        let install_args: Vec<String> = match target {
            RegistryTarget::Test => vec![
                "install".to_string(),
                "--index-url".to_string(),
                self.registry.test_index.clone(),
                "--extra-index-url".to_string(),
                self.registry.production_index.clone(),
                self.package.clone(),
            ],
            RegistryTarget::Production => {
                vec!["install".to_string(), self.package.clone()]
            }
        };
        let install_args: Vec<&str> = install_args.iter().map(String::as_str).collect();

        let code = process::run_streamed(&pip, &install_args, None).await?;
        if code != Some(0) {
            return Err(VerifyError::InstallFailed(code));
        }

        let venv_python = Self::venv_bin(&venv, "python");
        let import_stmt = format!("import {}", self.package.replace('-', "_"));
        let code = process::run_quiet(&venv_python, &["-c", &import_stmt], None).await?;
        if code != Some(0) {
            return Err(VerifyError::ImportFailed(code));
        }
        debug!("Import check passed");

        let console = Self::venv_bin(&venv, &self.console_command);
        let code = process::run_quiet(&console, &["--help"], None).await?;
        if code != Some(0) {
            return Err(VerifyError::CliProbeFailed(code));
        }

        info!("Installation verification successful");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venv_tools_resolve_under_bin() {
        let pip = InstallVerifier::venv_bin(Path::new("/tmp/v"), "pip");
        assert_eq!(pip, PathBuf::from("/tmp/v/bin/pip"));
    }
}
