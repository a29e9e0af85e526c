//! Pre-publish package validation
//!
//! Checks that the Python package is properly configured for the index:
//! descriptor metadata, directory structure, required files, version
//! consistency, critical dependencies, entry points and manifest.

use crate::config::Config;
use crate::descriptor;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Check {
    fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: None,
        }
    }

    fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: Some(detail.into()),
        }
    }

    fn presence(name: &str, present: bool, detail: impl Into<String>) -> Self {
        if present {
            Self::pass(name)
        } else {
            Self::fail(name, detail)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Section {
    pub name: String,
    pub checks: Vec<Check>,
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub sections: Vec<Section>,
}

impl ValidationReport {
    pub fn total(&self) -> usize {
        self.sections.iter().map(|s| s.checks.len()).sum()
    }

    pub fn passed_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.checks)
            .filter(|c| c.passed)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.passed_count()
    }

    pub fn passed(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Metadata fields the descriptor must declare under [project]
const PROJECT_FIELDS: &[&str] = &[
    "name",
    "version",
    "description",
    "authors",
    "license",
    "readme",
    "requires-python",
    "dependencies",
    "classifiers",
    "keywords",
    "urls",
    "scripts",
    "optional-dependencies",
];

/// Files the index release must ship alongside the package
const REQUIRED_FILES: &[&str] = &[
    "README.md",
    "LICENSE",
    "CHANGELOG.md",
    "pyproject.toml",
    "MANIFEST.in",
    "requirements.txt",
];

/// Runtime dependencies the package cannot function without
const CRITICAL_DEPENDENCIES: &[&str] = &["yt-dlp", "rich", "click"];

/// Run every validation section against the project root
pub fn validate_package(root: &Path, config: &Config) -> ValidationReport {
    debug!("Validating package at {}", root.display());
    let sections = vec![
        descriptor_section(root, config),
        structure_section(root, config),
        files_section(root),
        version_section(root, config),
        dependencies_section(root, config),
        entry_points_section(root, config),
        manifest_section(root),
    ];
    ValidationReport { sections }
}

fn descriptor_section(root: &Path, config: &Config) -> Section {
    let path = root.join(&config.project.descriptor);
    let mut checks = Vec::new();

    match descriptor::load(&path) {
        Ok(value) => {
            checks.push(Check::presence(
                "build-system",
                value.get("build-system").is_some(),
                "no [build-system] table",
            ));
            let project = value.get("project");
            for field in PROJECT_FIELDS {
                let present = project.and_then(|p| p.get(field)).is_some();
                checks.push(Check::presence(
                    field,
                    present,
                    format!("[project] is missing `{field}`"),
                ));
            }
        }
        Err(e) => checks.push(Check::fail("descriptor parses", e.to_string())),
    }

    Section {
        name: "descriptor".to_string(),
        checks,
    }
}

fn structure_section(root: &Path, config: &Config) -> Section {
    let package = root.join(&config.project.package_dir);
    let checks = vec![
        Check::presence(
            "package directory",
            package.is_dir(),
            format!("{} missing", package.display()),
        ),
        Check::presence(
            "__init__.py",
            package.join("__init__.py").is_file(),
            "package __init__.py missing",
        ),
        Check::presence(
            "__main__.py",
            package.join("__main__.py").is_file(),
            "package __main__.py missing",
        ),
        Check::presence(
            "cli subpackage",
            package.join("cli").is_dir(),
            "cli/ subpackage missing",
        ),
        Check::presence(
            "core subpackage",
            package.join("core").is_dir(),
            "core/ subpackage missing",
        ),
    ];

    Section {
        name: "structure".to_string(),
        checks,
    }
}

fn files_section(root: &Path) -> Section {
    let checks = REQUIRED_FILES
        .iter()
        .map(|file| Check::presence(file, root.join(file).is_file(), "file missing"))
        .collect();

    Section {
        name: "files".to_string(),
        checks,
    }
}

fn version_section(root: &Path, config: &Config) -> Section {
    let descriptor_path = root.join(&config.project.descriptor);
    let init_path = root.join(&config.project.package_dir).join("__init__.py");

    let check = match (
        descriptor::extract_version(&descriptor_path),
        descriptor::package_version(&init_path),
    ) {
        (Ok(descriptor_version), Ok(package_version)) => {
            if descriptor_version == package_version {
                Check::pass("consistency")
            } else {
                Check::fail(
                    "consistency",
                    format!(
                        "descriptor has {descriptor_version}, __init__.py has {package_version}"
                    ),
                )
            }
        }
        (Err(e), _) | (_, Err(e)) => Check::fail("consistency", e.to_string()),
    };

    Section {
        name: "version".to_string(),
        checks: vec![check],
    }
}

fn dependencies_section(root: &Path, config: &Config) -> Section {
    let path = root.join(&config.project.descriptor);
    let mut checks = Vec::new();

    let dependencies: Vec<String> = descriptor::load(&path)
        .ok()
        .and_then(|v| {
            v.get("project")?
                .get("dependencies")?
                .as_array()
                .map(|deps| {
                    deps.iter()
                        .filter_map(|d| d.as_str().map(str::to_string))
                        .collect()
                })
        })
        .unwrap_or_default();

    for dep in CRITICAL_DEPENDENCIES {
        let declared = dependencies.iter().any(|d| d.contains(dep));
        checks.push(Check::presence(
            dep,
            declared,
            format!("critical dependency `{dep}` not declared"),
        ));
    }

    Section {
        name: "dependencies".to_string(),
        checks,
    }
}

fn entry_points_section(root: &Path, config: &Config) -> Section {
    let path = root.join(&config.project.descriptor);
    let name = &config.project.name;
    let gui_name = format!("{name}-gui");
    let mut checks = Vec::new();

    let scripts = descriptor::load(&path)
        .ok()
        .and_then(|v| v.get("project")?.get("scripts")?.as_table().cloned());

    match scripts {
        Some(scripts) => {
            checks.push(Check::presence(
                "primary command",
                scripts.contains_key(name),
                format!("console command `{name}` not registered"),
            ));
            checks.push(Check::presence(
                "interactive command",
                scripts.contains_key(&gui_name),
                format!("console command `{gui_name}` not registered"),
            ));
        }
        None => checks.push(Check::fail("scripts table", "no [project.scripts] table")),
    }

    Section {
        name: "entry points".to_string(),
        checks,
    }
}

fn manifest_section(root: &Path) -> Section {
    let path = root.join("MANIFEST.in");
    let mut checks = Vec::new();

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            for include in ["README.md", "LICENSE", "CHANGELOG.md"] {
                checks.push(Check::presence(
                    include,
                    content.contains(include),
                    format!("MANIFEST.in does not include {include}"),
                ));
            }
        }
        Err(e) => checks.push(Check::fail("MANIFEST.in readable", e.to_string())),
    }

    Section {
        name: "manifest".to_string(),
        checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const DESCRIPTOR: &str = r#"
[build-system]
requires = ["setuptools>=61.0"]
build-backend = "setuptools.build_meta"

[project]
name = "tubeharvest"
version = "2.1.0"
description = "YouTube downloader with an interactive console interface"
authors = [{ name = "TubeHarvest Team" }]
license = { text = "MIT" }
readme = "README.md"
requires-python = ">=3.8"
dependencies = ["yt-dlp>=2023.12.30", "rich>=13.0.0", "click>=8.1.0"]
classifiers = ["Programming Language :: Python :: 3"]
keywords = ["youtube", "downloader"]

[project.urls]
Homepage = "https://github.com/tubeharvest/tubeharvest"

[project.scripts]
tubeharvest = "tubeharvest.cli.main:main"
tubeharvest-gui = "tubeharvest.cli.interactive:main"

[project.optional-dependencies]
dev = ["pytest>=7.0"]
"#;

    fn scaffold(root: &Path) {
        std::fs::write(root.join("pyproject.toml"), DESCRIPTOR).unwrap();
        let package = root.join("tubeharvest");
        std::fs::create_dir_all(package.join("cli")).unwrap();
        std::fs::create_dir_all(package.join("core")).unwrap();
        std::fs::write(package.join("__init__.py"), "__version__ = \"2.1.0\"\n").unwrap();
        std::fs::write(package.join("__main__.py"), "").unwrap();
        for file in ["README.md", "LICENSE", "CHANGELOG.md", "requirements.txt"] {
            std::fs::write(root.join(file), "x").unwrap();
        }
        std::fs::write(
            root.join("MANIFEST.in"),
            "include README.md\ninclude LICENSE\ninclude CHANGELOG.md\n",
        )
        .unwrap();
    }

    #[test]
    fn complete_package_passes_every_check() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());

        let report = validate_package(dir.path(), &Config::default());
        let failed: Vec<_> = report
            .sections
            .iter()
            .flat_map(|s| &s.checks)
            .filter(|c| !c.passed)
            .map(|c| c.name.clone())
            .collect();
        assert!(report.passed(), "failed checks: {failed:?}");
        assert_eq!(report.failed_count(), 0);
    }

    #[test]
    fn version_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        std::fs::write(
            dir.path().join("tubeharvest/__init__.py"),
            "__version__ = \"2.0.9\"\n",
        )
        .unwrap();

        let report = validate_package(dir.path(), &Config::default());
        let version = report
            .sections
            .iter()
            .find(|s| s.name == "version")
            .unwrap();
        assert!(!version.checks[0].passed);
        assert!(version.checks[0].detail.as_deref().unwrap().contains("2.0.9"));
    }

    #[test]
    fn missing_required_file_fails_the_report() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        std::fs::remove_file(dir.path().join("CHANGELOG.md")).unwrap();

        let report = validate_package(dir.path(), &Config::default());
        assert!(!report.passed());
        assert_eq!(report.failed_count(), 1);
    }

    #[test]
    fn missing_critical_dependency_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        let stripped = DESCRIPTOR.replace("\"rich>=13.0.0\", ", "");
        std::fs::write(dir.path().join("pyproject.toml"), stripped).unwrap();

        let report = validate_package(dir.path(), &Config::default());
        let deps = report
            .sections
            .iter()
            .find(|s| s.name == "dependencies")
            .unwrap();
        let rich = deps.checks.iter().find(|c| c.name == "rich").unwrap();
        assert!(!rich.passed);
    }

    #[test]
    fn empty_root_reports_failures_not_panics() {
        let dir = tempfile::tempdir().unwrap();
        let report = validate_package(dir.path(), &Config::default());
        assert!(!report.passed());
        assert!(report.total() > 0);
    }

    #[test]
    fn report_serialises_to_json() {
        let dir = tempfile::tempdir().unwrap();
        scaffold(dir.path());
        let report = validate_package(dir.path(), &Config::default());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"sections\""));
    }
}
