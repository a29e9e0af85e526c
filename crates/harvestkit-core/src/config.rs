//! Configuration management for harvestkit

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    pub registry: RegistryConfig,
    pub wiki: WikiConfig,
    pub checks: ChecksConfig,
    pub paths: PathsConfig,
    pub temp: TempConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Distribution name as published on the package index
    pub name: String,
    /// Importable package directory, relative to the project root
    pub package_dir: PathBuf,
    /// Package descriptor carrying the canonical version
    pub descriptor: PathBuf,
    /// Where the build backend drops wheels and sdists
    pub dist_dir: PathBuf,
    /// Test suite directory
    pub tests_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Production upload endpoint
    pub production_url: String,
    /// Test-index upload endpoint
    pub test_url: String,
    /// Simple index used when verifying a production install
    pub production_index: String,
    /// Simple index used when verifying a test install
    pub test_index: String,
    /// Environment variable holding the production token
    pub production_token_env: String,
    /// Environment variable holding the test-index token
    pub test_token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    /// Wiki repository clone URL
    pub repo_url: String,
    /// Local documentation directory to publish
    pub docs_dir: PathBuf,
    /// Persistent wiki checkout; a temp clone is used if not set
    pub checkout_dir: Option<PathBuf>,
    /// Commit author for sync commits
    pub author_name: String,
    pub author_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksConfig {
    /// flake8 error classes that break the build
    pub blocking_selectors: Vec<String>,
    /// Line length for the advisory style sweep
    pub max_line_length: u32,
    /// Complexity ceiling for the advisory style sweep
    pub max_complexity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to the Python interpreter (auto-detected if not set)
    pub python: Option<PathBuf>,
    /// Path to git (auto-detected if not set)
    pub git: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempConfig {
    /// Clean up scratch directories after use
    pub cleanup: bool,
    /// Custom temp directory (uses system temp if not set)
    pub directory: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                name: "tubeharvest".to_string(),
                package_dir: PathBuf::from("tubeharvest"),
                descriptor: PathBuf::from("pyproject.toml"),
                dist_dir: PathBuf::from("dist"),
                tests_dir: PathBuf::from("tests"),
            },
            registry: RegistryConfig {
                production_url: "https://upload.pypi.org/legacy/".to_string(),
                test_url: "https://test.pypi.org/legacy/".to_string(),
                production_index: "https://pypi.org/simple/".to_string(),
                test_index: "https://test.pypi.org/simple/".to_string(),
                production_token_env: "PYPI_API_TOKEN".to_string(),
                test_token_env: "TEST_PYPI_API_TOKEN".to_string(),
            },
            wiki: WikiConfig {
                repo_url: "https://github.com/tubeharvest/tubeharvest.wiki.git".to_string(),
                docs_dir: PathBuf::from("docs"),
                checkout_dir: None,
                author_name: "harvestkit".to_string(),
                author_email: "harvestkit@users.noreply.github.com".to_string(),
            },
            checks: ChecksConfig {
                blocking_selectors: vec![
                    "E9".to_string(),
                    "F63".to_string(),
                    "F7".to_string(),
                    "F82".to_string(),
                ],
                max_line_length: 127,
                max_complexity: 10,
            },
            paths: PathsConfig {
                python: None,
                git: None,
            },
            temp: TempConfig {
                cleanup: true,
                directory: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Load from default config directory
        if let Some(config_dir) = dirs::config_dir() {
            let default_config = config_dir.join("harvestkit/config.toml");
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        // Load from specified config file
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment
        figment = figment.merge(Env::prefixed("HARVESTKIT_").split("_"));

        figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Get Python interpreter path, auto-detecting if not configured
    pub fn python_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.python {
            Ok(path.clone())
        } else {
            which::which("python3")
                .or_else(|_| which::which("python"))
                .map_err(|_| ConfigError::InvalidValue("python3 not found in PATH".to_string()))
        }
    }

    /// Get git path, auto-detecting if not configured
    pub fn git_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.git {
            Ok(path.clone())
        } else {
            which::which("git")
                .map_err(|_| ConfigError::InvalidValue("git not found in PATH".to_string()))
        }
    }

    /// Get temp directory
    pub fn temp_dir(&self) -> PathBuf {
        self.temp
            .directory
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_both_registries() {
        let config = Config::default();
        assert_ne!(config.registry.production_url, config.registry.test_url);
        assert_eq!(config.registry.production_token_env, "PYPI_API_TOKEN");
        assert_eq!(config.registry.test_token_env, "TEST_PYPI_API_TOKEN");
    }

    #[test]
    fn blocking_selectors_cover_error_classes() {
        let config = Config::default();
        for class in ["E9", "F63", "F7", "F82"] {
            assert!(config.checks.blocking_selectors.iter().any(|s| s == class));
        }
    }
}
