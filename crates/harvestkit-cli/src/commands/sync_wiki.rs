use anyhow::Result;
use std::path::Path;
use tracing::warn;

use harvestkit_core::{
    config::Config,
    descriptor,
    wiki::{WikiAction, WikiSync},
};

pub async fn run(dry_run: bool, docs: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load(config_path)?;
    if let Some(docs) = docs {
        config.wiki.docs_dir = docs.to_path_buf();
    }

    // Version tag for the commit message; a sync can proceed without one.
    let version = match descriptor::extract_version(&config.project.descriptor) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Could not read project version: {e}");
            None
        }
    };

    let git = config.git_path()?;
    let sync = WikiSync::new(git, config.wiki.clone(), version);

    if dry_run {
        let actions = sync.plan()?;
        println!("Dry run: no files will be copied, nothing will be pushed\n");
        for action in &actions {
            match action {
                WikiAction::Copy { source, dest_name } => {
                    println!("  copy   {} -> {}", source.display(), dest_name);
                }
                WikiAction::Commit { message } => {
                    println!("  commit {:?}", message);
                }
                WikiAction::Push => {
                    println!("  push   {}", config.wiki.repo_url);
                }
            }
        }
        let copies = actions
            .iter()
            .filter(|a| matches!(a, WikiAction::Copy { .. }))
            .count();
        println!("\n{} files would be synced", copies);
        return Ok(());
    }

    let report = sync.sync().await?;

    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }

    if report.pushed {
        println!("Synced {} files to the wiki", report.copied);
    } else {
        println!(
            "Copied {} files, wiki already up to date (nothing pushed)",
            report.copied
        );
    }

    Ok(())
}
