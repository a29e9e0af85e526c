//! Subprocess plumbing shared by every release step

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished subprocess
#[derive(Debug)]
pub struct ToolOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Run a tool and capture its output
pub async fn run_captured(
    program: &Path,
    args: &[&str],
    cwd: Option<&Path>,
) -> std::io::Result<ToolOutput> {
    debug!("Running: {} {}", program.display(), args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().await?;

    Ok(ToolOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a tool with stdout/stderr passed through to the user
pub async fn run_streamed(
    program: &Path,
    args: &[&str],
    cwd: Option<&Path>,
) -> std::io::Result<Option<i32>> {
    debug!("Running: {} {}", program.display(), args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let status = cmd.status().await?;
    Ok(status.code())
}

/// Run a tool silently, reporting only its exit status
pub async fn run_quiet(
    program: &Path,
    args: &[&str],
    cwd: Option<&Path>,
) -> std::io::Result<Option<i32>> {
    debug!("Running: {} {}", program.display(), args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::null()).stderr(Stdio::null());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let status = cmd.status().await?;
    Ok(status.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn shell() -> PathBuf {
        PathBuf::from("/bin/sh")
    }

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let out = run_captured(&shell(), &["-c", "echo harvest"], None)
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "harvest");
    }

    #[tokio::test]
    async fn reports_nonzero_exit() {
        let out = run_captured(&shell(), &["-c", "exit 3"], None).await.unwrap();
        assert!(!out.success());
        assert_eq!(out.code, Some(3));
    }

    #[tokio::test]
    async fn quiet_run_returns_code() {
        let code = run_quiet(&shell(), &["-c", "exit 0"], None).await.unwrap();
        assert_eq!(code, Some(0));
    }
}
