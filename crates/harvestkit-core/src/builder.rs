//! Package building: clean, build, artifact verification, twine check

use crate::error::BuildError;
use crate::process;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Builder {
    python: PathBuf,
    root: PathBuf,
    dist_dir: PathBuf,
}

/// The two distributions a release must ship
#[derive(Debug, Clone)]
pub struct BuildArtifacts {
    pub wheel: PathBuf,
    pub sdist: PathBuf,
}

impl BuildArtifacts {
    pub fn paths(&self) -> [&Path; 2] {
        [self.wheel.as_path(), self.sdist.as_path()]
    }
}

impl Builder {
    pub fn new(python: PathBuf, root: PathBuf, dist_dir: PathBuf) -> Self {
        Self {
            python,
            root,
            dist_dir,
        }
    }

    fn dist_path(&self) -> PathBuf {
        self.root.join(&self.dist_dir)
    }

    /// Remove previous build output: dist/, build/ and *.egg-info
    pub fn clean(&self) -> Result<(), BuildError> {
        for dir in ["dist", "build"] {
            let path = self.root.join(dir);
            if path.exists() {
                debug!("Removing {}", path.display());
                std::fs::remove_dir_all(&path)?;
            }
        }

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().ends_with(".egg-info") && entry.path().is_dir() {
                debug!("Removing {}", entry.path().display());
                std::fs::remove_dir_all(entry.path())?;
            }
        }

        info!("Build artifacts cleaned");
        Ok(())
    }

    /// Build wheel and sdist with the standard build frontend
    pub async fn build(&self) -> Result<BuildArtifacts, BuildError> {
        info!("Building package");

        let code =
            process::run_streamed(&self.python, &["-m", "build"], Some(&self.root)).await?;
        if code != Some(0) {
            return Err(BuildError::BuildToolFailed(code));
        }

        self.verify_artifacts()
    }

    /// Check that the build left both a wheel and a source distribution
    pub fn verify_artifacts(&self) -> Result<BuildArtifacts, BuildError> {
        let dist = self.dist_path();
        if !dist.is_dir() {
            return Err(BuildError::NoDistDirectory(dist));
        }

        let mut wheel = None;
        let mut sdist = None;
        for entry in std::fs::read_dir(&dist)? {
            let path = entry?.path();
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            match name.as_deref() {
                Some(n) if n.ends_with(".whl") => wheel = Some(path),
                Some(n) if n.ends_with(".tar.gz") => sdist = Some(path),
                _ => {}
            }
        }

        let wheel = wheel.ok_or(BuildError::MissingWheel)?;
        let sdist = sdist.ok_or(BuildError::MissingSdist)?;

        info!(
            "Package built: {}, {}",
            wheel.file_name().unwrap_or_default().to_string_lossy(),
            sdist.file_name().unwrap_or_default().to_string_lossy()
        );

        Ok(BuildArtifacts { wheel, sdist })
    }

    /// Validate the distributions with twine before any upload
    pub async fn check_distribution(&self, artifacts: &BuildArtifacts) -> Result<(), BuildError> {
        let wheel = artifacts.wheel.to_string_lossy().into_owned();
        let sdist = artifacts.sdist.to_string_lossy().into_owned();

        let code = process::run_streamed(
            &self.python,
            &["-m", "twine", "check", &wheel, &sdist],
            Some(&self.root),
        )
        .await?;

        if code != Some(0) {
            return Err(BuildError::DistributionCheckFailed(code));
        }

        info!("Distribution check passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(root: &Path) -> Builder {
        Builder::new(
            PathBuf::from("python3"),
            root.to_path_buf(),
            PathBuf::from("dist"),
        )
    }

    fn touch(path: &Path) {
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn missing_dist_directory_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            builder(dir.path()).verify_artifacts(),
            Err(BuildError::NoDistDirectory(_))
        ));
    }

    #[test]
    fn wheel_without_sdist_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir(&dist).unwrap();
        touch(&dist.join("tubeharvest-2.1.0-py3-none-any.whl"));

        assert!(matches!(
            builder(dir.path()).verify_artifacts(),
            Err(BuildError::MissingSdist)
        ));
    }

    #[test]
    fn sdist_without_wheel_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir(&dist).unwrap();
        touch(&dist.join("tubeharvest-2.1.0.tar.gz"));

        assert!(matches!(
            builder(dir.path()).verify_artifacts(),
            Err(BuildError::MissingWheel)
        ));
    }

    #[test]
    fn both_distributions_pass_verification() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir(&dist).unwrap();
        touch(&dist.join("tubeharvest-2.1.0-py3-none-any.whl"));
        touch(&dist.join("tubeharvest-2.1.0.tar.gz"));

        let artifacts = builder(dir.path()).verify_artifacts().unwrap();
        assert!(artifacts.wheel.to_string_lossy().ends_with(".whl"));
        assert!(artifacts.sdist.to_string_lossy().ends_with(".tar.gz"));
    }

    #[test]
    fn clean_removes_build_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("dist")).unwrap();
        std::fs::create_dir(dir.path().join("build")).unwrap();
        std::fs::create_dir(dir.path().join("tubeharvest.egg-info")).unwrap();
        std::fs::create_dir(dir.path().join("tubeharvest")).unwrap();

        builder(dir.path()).clean().unwrap();

        assert!(!dir.path().join("dist").exists());
        assert!(!dir.path().join("build").exists());
        assert!(!dir.path().join("tubeharvest.egg-info").exists());
        assert!(dir.path().join("tubeharvest").exists());
    }
}
