//! Publish pipeline orchestration
//!
//! Linear and fail-fast: tests, quality gate, clean, build, distribution
//! check, upload, install verification. Any failing step aborts the rest.

use crate::builder::Builder;
use crate::checks::QualityChecks;
use crate::descriptor;
use crate::error::HarvestError;
use crate::uploader::{RegistryTarget, Uploader};
use crate::verifier::InstallVerifier;
use crate::Config;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

/// Publish pipeline configuration
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub root: PathBuf,
    pub target: RegistryTarget,
    pub skip_tests: bool,
    pub skip_checks: bool,
}

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PublishStage {
    RunningTests,
    QualityChecks,
    Cleaning,
    Building,
    CheckingDistribution,
    Uploading { target: RegistryTarget },
    VerifyingInstall,
    Complete { version: String, duration: Duration },
    Failed { stage: String, error: String },
}

/// Main publishing pipeline
pub struct Publisher {
    config: PublishConfig,
    app: Config,
    progress_tx: mpsc::Sender<PublishStage>,
}

impl Publisher {
    pub fn new(
        config: PublishConfig,
        app: Config,
        progress_tx: mpsc::Sender<PublishStage>,
    ) -> Self {
        Self {
            config,
            app,
            progress_tx,
        }
    }

    pub async fn run(&self) -> Result<(), HarvestError> {
        let start_time = Instant::now();

        let root = self.config.root.clone();
        let python = self.app.python_path().map_err(|e| {
            let _ = self.progress_tx.try_send(PublishStage::Failed {
                stage: "config".to_string(),
                error: e.to_string(),
            });
            e
        })?;
        let version = descriptor::extract_version(&root.join(&self.app.project.descriptor))
            .map_err(|e| {
                let _ = self.progress_tx.try_send(PublishStage::Failed {
                    stage: "descriptor".to_string(),
                    error: e.to_string(),
                });
                e
            })?;

        info!(
            "Publishing {} {} to {}",
            self.app.project.name, version, self.config.target
        );

        let checks = QualityChecks::new(
            python.clone(),
            root.clone(),
            self.app.project.package_dir.clone(),
            self.app.project.tests_dir.clone(),
            self.app.checks.clone(),
        );

        // 1. Test suite
        if !self.config.skip_tests {
            let _ = self.progress_tx.send(PublishStage::RunningTests).await;
            checks.run_tests().await.map_err(|e| {
                let _ = self.progress_tx.try_send(PublishStage::Failed {
                    stage: "tests".to_string(),
                    error: e.to_string(),
                });
                e
            })?;
        }

        // 2. Quality gate
        if !self.config.skip_checks {
            let _ = self.progress_tx.send(PublishStage::QualityChecks).await;
            checks.quality_gate().await.map_err(|e| {
                let _ = self.progress_tx.try_send(PublishStage::Failed {
                    stage: "checks".to_string(),
                    error: e.to_string(),
                });
                e
            })?;
        }

        let builder = Builder::new(
            python.clone(),
            root.clone(),
            self.app.project.dist_dir.clone(),
        );

        // 3. Clean previous artifacts
        let _ = self.progress_tx.send(PublishStage::Cleaning).await;
        builder.clean().map_err(|e| {
            let _ = self.progress_tx.try_send(PublishStage::Failed {
                stage: "clean".to_string(),
                error: e.to_string(),
            });
            e
        })?;

        // 4. Build wheel and sdist
        let _ = self.progress_tx.send(PublishStage::Building).await;
        let artifacts = builder.build().await.map_err(|e| {
            let _ = self.progress_tx.try_send(PublishStage::Failed {
                stage: "build".to_string(),
                error: e.to_string(),
            });
            e
        })?;

        // 5. twine check
        let _ = self
            .progress_tx
            .send(PublishStage::CheckingDistribution)
            .await;
        builder.check_distribution(&artifacts).await.map_err(|e| {
            let _ = self.progress_tx.try_send(PublishStage::Failed {
                stage: "twine check".to_string(),
                error: e.to_string(),
            });
            e
        })?;

        // 6. Upload
        let _ = self
            .progress_tx
            .send(PublishStage::Uploading {
                target: self.config.target,
            })
            .await;
        let uploader = Uploader::new(python.clone(), self.app.registry.clone());
        uploader
            .upload(self.config.target, &artifacts)
            .await
            .map_err(|e| {
                let _ = self.progress_tx.try_send(PublishStage::Failed {
                    stage: "upload".to_string(),
                    error: e.to_string(),
                });
                e
            })?;

        // 7. Verify the published package installs
        let _ = self.progress_tx.send(PublishStage::VerifyingInstall).await;
        self.verify_install(&python).await?;

        let duration = start_time.elapsed();
        info!(
            "Publish complete: {} {} ({:.1}s)",
            self.app.project.name,
            version,
            duration.as_secs_f32()
        );

        let _ = self
            .progress_tx
            .send(PublishStage::Complete { version, duration })
            .await;

        Ok(())
    }

    /// Run only the install-verification stage (`--verify-only`)
    pub async fn verify_only(&self) -> Result<(), HarvestError> {
        let start_time = Instant::now();
        let python = self.app.python_path()?;

        let _ = self.progress_tx.send(PublishStage::VerifyingInstall).await;
        self.verify_install(&python).await?;

        let version =
            descriptor::extract_version(&self.config.root.join(&self.app.project.descriptor))
                .unwrap_or_else(|_| "unknown".to_string());

        let _ = self
            .progress_tx
            .send(PublishStage::Complete {
                version,
                duration: start_time.elapsed(),
            })
            .await;

        Ok(())
    }

    async fn verify_install(&self, python: &Path) -> Result<(), HarvestError> {
        let verifier = InstallVerifier::new(
            python.to_path_buf(),
            self.app.project.name.clone(),
            self.app.project.name.clone(),
            self.app.registry.clone(),
        );
        verifier.verify(self.config.target).await.map_err(|e| {
            let _ = self.progress_tx.try_send(PublishStage::Failed {
                stage: "verify install".to_string(),
                error: e.to_string(),
            });
            e
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A build that leaves no artifacts must fail the pipeline before any
    /// upload is attempted.
    #[tokio::test]
    async fn missing_artifacts_abort_the_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"tubeharvest\"\nversion = \"2.1.0\"\n",
        )
        .unwrap();

        let mut app = Config::default();
        // Point the interpreter at `true` so every tool invocation exits 0
        // without doing anything; the artifact scan then finds no dist/.
        app.paths.python = Some(PathBuf::from("/bin/true"));

        let config = PublishConfig {
            root: dir.path().to_path_buf(),
            target: RegistryTarget::Test,
            skip_tests: true,
            skip_checks: true,
        };

        let (tx, mut rx) = mpsc::channel(32);
        let publisher = Publisher::new(config, app, tx);
        let result = publisher.run().await;
        assert!(result.is_err());

        // The failure surfaced as a stage event too.
        let mut saw_failed = false;
        while let Ok(stage) = rx.try_recv() {
            if let PublishStage::Failed { stage, .. } = stage {
                assert_eq!(stage, "build");
                saw_failed = true;
            }
        }
        assert!(saw_failed);
    }

    #[tokio::test]
    async fn missing_descriptor_fails_before_any_stage() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = Config::default();
        app.paths.python = Some(PathBuf::from("/bin/true"));

        let config = PublishConfig {
            root: dir.path().to_path_buf(),
            target: RegistryTarget::Test,
            skip_tests: true,
            skip_checks: true,
        };

        let (tx, _rx) = mpsc::channel(32);
        let publisher = Publisher::new(config, app, tx);
        assert!(matches!(
            publisher.run().await,
            Err(HarvestError::Descriptor(_))
        ));
    }
}
