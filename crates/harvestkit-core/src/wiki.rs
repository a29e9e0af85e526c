//! Wiki synchronisation: publish the docs directory to the project wiki
//!
//! Planning is separated from execution so that a dry run can show every
//! intended copy, the commit and the push without touching the filesystem
//! or the network.

use crate::config::WikiConfig;
use crate::error::WikiError;
use crate::process;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One intended step of a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikiAction {
    Copy { source: PathBuf, dest_name: String },
    Commit { message: String },
    Push,
}

/// What a completed (non-dry) run actually did
#[derive(Debug, Default)]
pub struct SyncReport {
    pub copied: usize,
    pub committed: bool,
    pub pushed: bool,
    pub warnings: Vec<String>,
}

/// Wiki page name for a docs file: `.txt` and `.rst` sources become `.md`
/// pages under the same base name, everything else keeps its name.
pub fn wiki_file_name(source: &Path) -> Option<String> {
    let name = source.file_name()?.to_string_lossy().into_owned();
    match source.extension().and_then(|e| e.to_str()) {
        Some("txt") | Some("rst") => {
            let stem = source.file_stem()?.to_string_lossy().into_owned();
            Some(format!("{stem}.md"))
        }
        _ => Some(name),
    }
}

#[derive(Debug)]
pub struct WikiSync {
    git: PathBuf,
    config: WikiConfig,
    version: Option<String>,
}

impl WikiSync {
    pub fn new(git: PathBuf, config: WikiConfig, version: Option<String>) -> Self {
        Self {
            git,
            config,
            version,
        }
    }

    fn commit_message(&self) -> String {
        let date = Utc::now().format("%Y-%m-%d");
        match &self.version {
            Some(v) => format!("Sync documentation (v{v}, {date})"),
            None => format!("Sync documentation ({date})"),
        }
    }

    /// Compute the full action plan from the docs directory. Read-only:
    /// this is everything a dry run is allowed to do.
    pub fn plan(&self) -> Result<Vec<WikiAction>, WikiError> {
        let docs = &self.config.docs_dir;
        if !docs.is_dir() {
            return Err(WikiError::DocsDirMissing(docs.clone()));
        }

        let mut sources = Vec::new();
        for entry in std::fs::read_dir(docs)? {
            let path = entry?.path();
            if path.is_file() {
                sources.push(path);
            }
        }
        sources.sort();

        let mut actions = Vec::new();
        for source in sources {
            if let Some(dest_name) = wiki_file_name(&source) {
                actions.push(WikiAction::Copy { source, dest_name });
            }
        }
        actions.push(WikiAction::Commit {
            message: self.commit_message(),
        });
        actions.push(WikiAction::Push);

        Ok(actions)
    }

    /// Get a usable wiki checkout. A persistent checkout that fails to
    /// update is used as-is with a warning; a failed clone is fatal.
    async fn checkout(&self, report: &mut SyncReport) -> Result<(PathBuf, Option<tempfile::TempDir>), WikiError> {
        if let Some(dir) = &self.config.checkout_dir {
            if dir.join(".git").is_dir() {
                debug!("Updating wiki checkout at {}", dir.display());
                let dir_str = dir.to_string_lossy().into_owned();
                let code = process::run_streamed(
                    &self.git,
                    &["-C", &dir_str, "pull", "--ff-only"],
                    None,
                )
                .await?;
                if code != Some(0) {
                    let msg = format!(
                        "wiki checkout update failed (exit code {code:?}), syncing against stale checkout"
                    );
                    warn!("{msg}");
                    report.warnings.push(msg);
                }
                return Ok((dir.clone(), None));
            }

            self.clone_into(dir).await?;
            return Ok((dir.clone(), None));
        }

        let scratch = tempfile::tempdir()?;
        let target = scratch.path().join("wiki");
        self.clone_into(&target).await?;
        Ok((target, Some(scratch)))
    }

    async fn clone_into(&self, target: &Path) -> Result<(), WikiError> {
        info!("Cloning wiki repository");
        let target_str = target.to_string_lossy().into_owned();
        let code = process::run_streamed(
            &self.git,
            &["clone", &self.config.repo_url, &target_str],
            None,
        )
        .await?;
        if code != Some(0) {
            return Err(WikiError::CloneFailed(code));
        }
        Ok(())
    }

    /// Execute a full sync: checkout, copy, commit, push
    pub async fn sync(&self) -> Result<SyncReport, WikiError> {
        let actions = self.plan()?;
        let mut report = SyncReport::default();

        let (checkout, _scratch) = self.checkout(&mut report).await?;
        let checkout_str = checkout.to_string_lossy().into_owned();

        for action in &actions {
            if let WikiAction::Copy { source, dest_name } = action {
                let dest = checkout.join(dest_name);
                debug!("Copying {} -> {}", source.display(), dest.display());
                std::fs::copy(source, &dest)?;
                report.copied += 1;
            }
        }
        info!("Copied {} documentation files", report.copied);

        // Nothing staged means nothing to commit or push.
        let status = process::run_captured(
            &self.git,
            &["-C", &checkout_str, "status", "--porcelain"],
            None,
        )
        .await?;
        if status.stdout.trim().is_empty() {
            info!("Wiki already up to date, nothing to sync");
            return Ok(report);
        }

        let code = process::run_quiet(&self.git, &["-C", &checkout_str, "add", "-A"], None)
            .await?;
        if code != Some(0) {
            return Err(WikiError::CommitFailed(code));
        }

        let message = self.commit_message();
        let author_name = format!("user.name={}", self.config.author_name);
        let author_email = format!("user.email={}", self.config.author_email);
        let code = process::run_streamed(
            &self.git,
            &[
                "-C",
                &checkout_str,
                "-c",
                &author_name,
                "-c",
                &author_email,
                "commit",
                "-m",
                &message,
            ],
            None,
        )
        .await?;
        if code != Some(0) {
            return Err(WikiError::CommitFailed(code));
        }
        report.committed = true;
        info!("Committed: {message}");

        let code =
            process::run_streamed(&self.git, &["-C", &checkout_str, "push"], None).await?;
        if code != Some(0) {
            return Err(WikiError::PushFailed(code));
        }
        report.pushed = true;
        info!("Pushed wiki update");

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn sync_for(docs: &Path) -> WikiSync {
        let mut wiki = Config::default().wiki;
        wiki.docs_dir = docs.to_path_buf();
        WikiSync::new(PathBuf::from("git"), wiki, Some("2.1.0".to_string()))
    }

    #[test]
    fn txt_and_rst_become_md_preserving_base_name() {
        assert_eq!(
            wiki_file_name(Path::new("docs/Installation.txt")).unwrap(),
            "Installation.md"
        );
        assert_eq!(
            wiki_file_name(Path::new("docs/API-Reference.rst")).unwrap(),
            "API-Reference.md"
        );
    }

    #[test]
    fn md_and_assets_keep_their_names() {
        assert_eq!(wiki_file_name(Path::new("docs/Home.md")).unwrap(), "Home.md");
        assert_eq!(
            wiki_file_name(Path::new("docs/screenshot.png")).unwrap(),
            "screenshot.png"
        );
    }

    #[test]
    fn plan_orders_copies_before_commit_and_push() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Home.md"), b"# Home").unwrap();
        std::fs::write(dir.path().join("Usage.rst"), b"Usage").unwrap();
        std::fs::create_dir(dir.path().join("img")).unwrap();

        let actions = sync_for(dir.path()).plan().unwrap();

        // Two files, the subdirectory is skipped
        assert_eq!(actions.len(), 4);
        assert!(matches!(&actions[0], WikiAction::Copy { dest_name, .. } if dest_name == "Home.md"));
        assert!(matches!(&actions[1], WikiAction::Copy { dest_name, .. } if dest_name == "Usage.md"));
        assert!(matches!(&actions[2], WikiAction::Commit { message } if message.contains("v2.1.0")));
        assert_eq!(actions[3], WikiAction::Push);
    }

    #[test]
    fn missing_docs_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("docs");
        assert!(matches!(
            sync_for(&missing).plan(),
            Err(WikiError::DocsDirMissing(_))
        ));
    }

    #[test]
    fn planning_does_not_mutate_the_docs_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Guide.txt"), b"guide").unwrap();

        sync_for(dir.path()).plan().unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["Guide.txt"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Guide.txt")).unwrap(),
            "guide"
        );
    }

    #[test]
    fn commit_message_without_version_still_carries_date() {
        let dir = tempfile::tempdir().unwrap();
        let mut wiki = Config::default().wiki;
        wiki.docs_dir = dir.path().to_path_buf();
        let sync = WikiSync::new(PathBuf::from("git"), wiki, None);
        let message = sync.commit_message();
        assert!(message.starts_with("Sync documentation ("));
        assert!(!message.contains('v'));
    }
}
