//! Error types for harvestkit-core

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarvestError>;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    #[error("Quality check failed: {0}")]
    Check(#[from] CheckError),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Install verification failed: {0}")]
    Verify(#[from] VerifyError),

    #[error("Wiki sync failed: {0}")]
    Wiki(#[from] WikiError),

    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("build backend failed with exit code: {0:?}")]
    BuildToolFailed(Option<i32>),

    #[error("no dist directory at {} after build", .0.display())]
    NoDistDirectory(PathBuf),

    #[error("no wheel (*.whl) found in dist directory")]
    MissingWheel,

    #[error("no source distribution (*.tar.gz) found in dist directory")]
    MissingSdist,

    #[error("twine check rejected the distribution (exit code: {0:?})")]
    DistributionCheckFailed(Option<i32>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("test suite failed with exit code: {0:?}")]
    TestsFailed(Option<i32>),

    #[error("formatting check failed, run: black {0}")]
    FormattingIssues(String),

    #[error("lint found blocking errors")]
    LintErrors,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("credential environment variable {0} is not set")]
    MissingCredentials(String),

    #[error("twine upload failed with exit code: {0:?}")]
    TwineFailed(Option<i32>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("failed to create virtual environment (exit code: {0:?})")]
    VenvFailed(Option<i32>),

    #[error("pip install failed with exit code: {0:?}")]
    InstallFailed(Option<i32>),

    #[error("installed package failed to import (exit code: {0:?})")]
    ImportFailed(Option<i32>),

    #[error("installed console command failed to answer --help (exit code: {0:?})")]
    CliProbeFailed(Option<i32>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum WikiError {
    #[error("docs directory not found: {}", .0.display())]
    DocsDirMissing(PathBuf),

    #[error("git clone failed with exit code: {0:?}")]
    CloneFailed(Option<i32>),

    #[error("git commit failed with exit code: {0:?}")]
    CommitFailed(Option<i32>),

    #[error("git push failed with exit code: {0:?}")]
    PushFailed(Option<i32>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("package descriptor not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no version field found in {}", .0.display())]
    VersionNotFound(PathBuf),

    #[error("descriptor is not valid TOML: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
