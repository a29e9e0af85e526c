//! Distribution upload to the production or test package index

use crate::builder::BuildArtifacts;
use crate::config::RegistryConfig;
use crate::error::UploadError;
use crate::process;
use std::path::PathBuf;
use tracing::info;

/// Which package index a release targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryTarget {
    Test,
    Production,
}

impl std::fmt::Display for RegistryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryTarget::Test => write!(f, "test index"),
            RegistryTarget::Production => write!(f, "production index"),
        }
    }
}

#[derive(Debug)]
pub struct Uploader {
    python: PathBuf,
    registry: RegistryConfig,
}

impl Uploader {
    pub fn new(python: PathBuf, registry: RegistryConfig) -> Self {
        Self { python, registry }
    }

    fn token_env(&self, target: RegistryTarget) -> &str {
        match target {
            RegistryTarget::Test => &self.registry.test_token_env,
            RegistryTarget::Production => &self.registry.production_token_env,
        }
    }

    fn repository_url(&self, target: RegistryTarget) -> &str {
        match target {
            RegistryTarget::Test => &self.registry.test_url,
            RegistryTarget::Production => &self.registry.production_url,
        }
    }

    /// Read the upload token for a target from the environment. The token
    /// value must never reach logs or error messages.
    pub fn token(&self, target: RegistryTarget) -> Result<String, UploadError> {
        let env = self.token_env(target);
        std::env::var(env)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| UploadError::MissingCredentials(env.to_string()))
    }

    /// twine upload to the chosen index
    pub async fn upload(
        &self,
        target: RegistryTarget,
        artifacts: &BuildArtifacts,
    ) -> Result<(), UploadError> {
        let token = self.token(target)?;
        let repository_url = self.repository_url(target).to_string();
        let wheel = artifacts.wheel.to_string_lossy().into_owned();
        let sdist = artifacts.sdist.to_string_lossy().into_owned();

        info!("Uploading to {target}");

        let code = process::run_streamed(
            &self.python,
            &[
                "-m",
                "twine",
                "upload",
                "--non-interactive",
                "--repository-url",
                &repository_url,
                "--username",
                "__token__",
                "--password",
                &token,
                &wheel,
                &sdist,
            ],
            None,
        )
        .await?;

        if code != Some(0) {
            return Err(UploadError::TwineFailed(code));
        }

        info!("Uploaded to {target}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn uploader() -> Uploader {
        Uploader::new(PathBuf::from("python3"), Config::default().registry)
    }

    #[test]
    fn target_selects_token_env() {
        let up = uploader();
        assert_eq!(up.token_env(RegistryTarget::Test), "TEST_PYPI_API_TOKEN");
        assert_eq!(up.token_env(RegistryTarget::Production), "PYPI_API_TOKEN");
    }

    #[test]
    fn target_selects_repository_url() {
        let up = uploader();
        assert!(up.repository_url(RegistryTarget::Test).contains("test.pypi"));
        assert!(!up
            .repository_url(RegistryTarget::Production)
            .contains("test.pypi"));
    }

    #[test]
    fn missing_token_names_the_variable() {
        let up = Uploader::new(
            PathBuf::from("python3"),
            RegistryConfig {
                test_token_env: "HARVESTKIT_TEST_TOKEN_UNSET".to_string(),
                ..Config::default().registry
            },
        );
        match up.token(RegistryTarget::Test) {
            Err(UploadError::MissingCredentials(env)) => {
                assert_eq!(env, "HARVESTKIT_TEST_TOKEN_UNSET")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
