//! Package descriptor access: version extraction and TOML parsing

use crate::error::DescriptorError;
use regex::Regex;
use std::path::Path;

/// Extract the project version from the TOML descriptor by text pattern
/// matching, without a full parse. This mirrors how the sync tooling tags
/// commit messages.
pub fn extract_version(descriptor: &Path) -> Result<String, DescriptorError> {
    if !descriptor.exists() {
        return Err(DescriptorError::NotFound(descriptor.to_path_buf()));
    }

    let content = std::fs::read_to_string(descriptor)?;
    // First `version = "..."` assignment wins; in a well-formed descriptor
    // that is [project].version.
    let re = Regex::new(r#"(?m)^\s*version\s*=\s*"([^"]+)""#).expect("static regex");

    re.captures(&content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| DescriptorError::VersionNotFound(descriptor.to_path_buf()))
}

/// Extract `__version__` from the package `__init__.py`
pub fn package_version(init_py: &Path) -> Result<String, DescriptorError> {
    if !init_py.exists() {
        return Err(DescriptorError::NotFound(init_py.to_path_buf()));
    }

    let content = std::fs::read_to_string(init_py)?;
    let re = Regex::new(r#"(?m)^__version__\s*=\s*["']([^"']+)["']"#).expect("static regex");

    re.captures(&content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| DescriptorError::VersionNotFound(init_py.to_path_buf()))
}

/// Fully parse the descriptor for field-level validation
pub fn load(descriptor: &Path) -> Result<toml::Value, DescriptorError> {
    if !descriptor.exists() {
        return Err(DescriptorError::NotFound(descriptor.to_path_buf()));
    }

    let content = std::fs::read_to_string(descriptor)?;
    content
        .parse::<toml::Value>()
        .map_err(|e| DescriptorError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn extracts_project_version() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = write_file(
            &dir,
            "pyproject.toml",
            "[build-system]\nrequires = [\"setuptools\"]\n\n[project]\nname = \"tubeharvest\"\nversion = \"2.1.0\"\n",
        );
        assert_eq!(extract_version(&descriptor).unwrap(), "2.1.0");
    }

    #[test]
    fn missing_version_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = write_file(&dir, "pyproject.toml", "[project]\nname = \"x\"\n");
        assert!(matches!(
            extract_version(&descriptor),
            Err(DescriptorError::VersionNotFound(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(
            extract_version(&path),
            Err(DescriptorError::NotFound(_))
        ));
    }

    #[test]
    fn reads_dunder_version() {
        let dir = tempfile::tempdir().unwrap();
        let init = write_file(
            &dir,
            "__init__.py",
            "\"\"\"TubeHarvest.\"\"\"\n\n__version__ = \"2.1.0\"\n__author__ = \"TubeHarvest Team\"\n",
        );
        assert_eq!(package_version(&init).unwrap(), "2.1.0");
    }

    #[test]
    fn single_quoted_dunder_version() {
        let dir = tempfile::tempdir().unwrap();
        let init = write_file(&dir, "__init__.py", "__version__ = '0.9.3'\n");
        assert_eq!(package_version(&init).unwrap(), "0.9.3");
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = write_file(&dir, "pyproject.toml", "[project\nname=");
        assert!(matches!(load(&descriptor), Err(DescriptorError::Parse(_))));
    }
}
