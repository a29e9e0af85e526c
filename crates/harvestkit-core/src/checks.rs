//! Quality checks: formatting, lint, types, tests, security scan
//!
//! Lint runs in two passes the way the CI job does: a narrow selection of
//! error classes that breaks the build, then a full style sweep that only
//! warns.

use crate::config::ChecksConfig;
use crate::error::CheckError;
use crate::process;
use std::path::PathBuf;
use tracing::{info, warn};

/// Whether a failed step fails the suite or only warns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Blocking,
    Advisory,
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::Blocking => write!(f, "blocking"),
            Gate::Advisory => write!(f, "advisory"),
        }
    }
}

#[derive(Debug)]
pub struct CheckOutcome {
    pub name: String,
    pub gate: Gate,
    pub passed: bool,
    pub detail: Option<String>,
}

impl CheckOutcome {
    fn new(name: &str, gate: Gate, passed: bool, detail: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            gate,
            passed,
            detail,
        }
    }

    /// True when this outcome alone should fail the suite
    pub fn breaks_build(&self) -> bool {
        self.gate == Gate::Blocking && !self.passed
    }
}

/// True when every blocking step passed
pub fn verdict(outcomes: &[CheckOutcome]) -> bool {
    !outcomes.iter().any(CheckOutcome::breaks_build)
}

#[derive(Debug)]
pub struct QualityChecks {
    python: PathBuf,
    root: PathBuf,
    package_dir: PathBuf,
    tests_dir: PathBuf,
    config: ChecksConfig,
}

impl QualityChecks {
    pub fn new(
        python: PathBuf,
        root: PathBuf,
        package_dir: PathBuf,
        tests_dir: PathBuf,
        config: ChecksConfig,
    ) -> Self {
        Self {
            python,
            root,
            package_dir,
            tests_dir,
            config,
        }
    }

    fn package(&self) -> String {
        self.package_dir.to_string_lossy().into_owned()
    }

    /// black --check; blocking
    pub async fn formatting(&self) -> Result<CheckOutcome, CheckError> {
        let package = self.package();
        let out = process::run_captured(
            &self.python,
            &["-m", "black", "--check", &package],
            Some(&self.root),
        )
        .await?;

        Ok(CheckOutcome::new(
            "format (black --check)",
            Gate::Blocking,
            out.success(),
            (!out.success()).then(|| format!("run: black {package}")),
        ))
    }

    /// flake8 restricted to the configured error classes; blocking
    pub async fn lint_errors(&self) -> Result<CheckOutcome, CheckError> {
        let package = self.package();
        let select = format!("--select={}", self.config.blocking_selectors.join(","));
        let out = process::run_captured(
            &self.python,
            &["-m", "flake8", &select, "--show-source", &package],
            Some(&self.root),
        )
        .await?;

        Ok(CheckOutcome::new(
            "lint errors (flake8)",
            Gate::Blocking,
            out.success(),
            (!out.success()).then(|| out.stdout.trim().to_string()),
        ))
    }

    /// Full flake8 style sweep with --exit-zero; advisory
    pub async fn lint_style(&self) -> Result<CheckOutcome, CheckError> {
        let package = self.package();
        let line_length = format!("--max-line-length={}", self.config.max_line_length);
        let complexity = format!("--max-complexity={}", self.config.max_complexity);
        let out = process::run_captured(
            &self.python,
            &[
                "-m",
                "flake8",
                "--exit-zero",
                &line_length,
                &complexity,
                "--statistics",
                &package,
            ],
            Some(&self.root),
        )
        .await?;

        // --exit-zero means the exit code is useless; any output means findings.
        let clean = out.stdout.trim().is_empty();
        Ok(CheckOutcome::new(
            "lint style (flake8 --exit-zero)",
            Gate::Advisory,
            clean,
            (!clean).then(|| out.stdout.trim().to_string()),
        ))
    }

    /// mypy; advisory
    pub async fn type_check(&self) -> Result<CheckOutcome, CheckError> {
        let package = self.package();
        let out = process::run_captured(
            &self.python,
            &["-m", "mypy", &package],
            Some(&self.root),
        )
        .await?;

        Ok(CheckOutcome::new(
            "types (mypy)",
            Gate::Advisory,
            out.success(),
            (!out.success()).then(|| out.stdout.trim().to_string()),
        ))
    }

    async fn pytest_code(&self) -> Result<Option<i32>, CheckError> {
        let tests = self.tests_dir.to_string_lossy().into_owned();
        let code = process::run_streamed(
            &self.python,
            &["-m", "pytest", &tests, "-v"],
            Some(&self.root),
        )
        .await?;
        Ok(code)
    }

    /// pytest; blocking
    pub async fn tests(&self) -> Result<CheckOutcome, CheckError> {
        let code = self.pytest_code().await?;
        Ok(CheckOutcome::new(
            "tests (pytest)",
            Gate::Blocking,
            code == Some(0),
            None,
        ))
    }

    /// bandit; advisory
    pub async fn security_scan(&self) -> Result<CheckOutcome, CheckError> {
        let package = self.package();
        let out = process::run_captured(
            &self.python,
            &["-m", "bandit", "-r", &package, "-q"],
            Some(&self.root),
        )
        .await?;

        Ok(CheckOutcome::new(
            "security (bandit)",
            Gate::Advisory,
            out.success(),
            (!out.success()).then(|| out.stdout.trim().to_string()),
        ))
    }

    /// The pre-publish gate: formatting and blocking lint, fail-fast
    pub async fn quality_gate(&self) -> Result<(), CheckError> {
        info!("Running code quality checks");

        let formatting = self.formatting().await?;
        if formatting.breaks_build() {
            return Err(CheckError::FormattingIssues(self.package()));
        }

        let lint = self.lint_errors().await?;
        if lint.breaks_build() {
            if let Some(detail) = &lint.detail {
                warn!("{detail}");
            }
            return Err(CheckError::LintErrors);
        }

        info!("Quality checks passed");
        Ok(())
    }

    /// The full CI sequence, collecting every outcome
    pub async fn ci_suite(&self) -> Result<Vec<CheckOutcome>, CheckError> {
        let mut outcomes = vec![
            self.formatting().await?,
            self.lint_errors().await?,
            self.lint_style().await?,
            self.type_check().await?,
            self.tests().await?,
            self.security_scan().await?,
        ];

        for outcome in &mut outcomes {
            if !outcome.passed && outcome.gate == Gate::Advisory {
                warn!("{} reported findings (advisory)", outcome.name);
            }
        }

        Ok(outcomes)
    }

    /// Run just the test suite, fail-fast
    pub async fn run_tests(&self) -> Result<(), CheckError> {
        info!("Running tests");
        let code = self.pytest_code().await?;
        if code != Some(0) {
            return Err(CheckError::TestsFailed(code));
        }
        info!("All tests passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(gate: Gate, passed: bool) -> CheckOutcome {
        CheckOutcome::new("step", gate, passed, None)
    }

    #[test]
    fn blocking_failure_breaks_build() {
        assert!(outcome(Gate::Blocking, false).breaks_build());
        assert!(!outcome(Gate::Blocking, true).breaks_build());
    }

    #[test]
    fn advisory_failure_never_breaks_build() {
        assert!(!outcome(Gate::Advisory, false).breaks_build());
    }

    #[test]
    fn verdict_fails_only_on_blocking_failures() {
        assert!(verdict(&[
            outcome(Gate::Blocking, true),
            outcome(Gate::Advisory, false),
        ]));
        assert!(!verdict(&[
            outcome(Gate::Blocking, false),
            outcome(Gate::Advisory, true),
        ]));
        assert!(verdict(&[]));
    }
}
