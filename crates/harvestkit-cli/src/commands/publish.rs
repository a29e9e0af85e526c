use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::Path;
use tokio::sync::mpsc;

use harvestkit_core::{
    config::Config,
    pipeline::{PublishConfig, PublishStage, Publisher},
    uploader::RegistryTarget,
};

pub struct PublishOptions {
    pub test: bool,
    pub prod: bool,
    pub skip_tests: bool,
    pub skip_checks: bool,
    pub verify_only: bool,
    pub yes: bool,
}

pub async fn run(options: &PublishOptions, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    if !options.test && !options.prod && !options.verify_only {
        bail!("choose a target: --test, --prod or --verify-only (see --help)");
    }

    let target = if options.prod {
        RegistryTarget::Production
    } else {
        RegistryTarget::Test
    };

    if options.prod && !options.verify_only && !options.yes && !confirm_production(&config)? {
        bail!("upload cancelled");
    }

    let publish_config = PublishConfig {
        root: std::env::current_dir()?,
        target,
        skip_tests: options.skip_tests,
        skip_checks: options.skip_checks,
    };

    // Create progress channel
    let (tx, mut rx) = mpsc::channel(32);

    // Create progress bar
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{elapsed_precise}] {bar:40.cyan/blue} {msg}",
        )?
        .progress_chars("=>-"),
    );

    // Spawn progress handler
    let progress_handle = tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            match stage {
                PublishStage::RunningTests => {
                    pb.set_position(5);
                    pb.set_message("Running tests...");
                }
                PublishStage::QualityChecks => {
                    pb.set_position(20);
                    pb.set_message("Running quality checks...");
                }
                PublishStage::Cleaning => {
                    pb.set_position(30);
                    pb.set_message("Cleaning build artifacts...");
                }
                PublishStage::Building => {
                    pb.set_position(40);
                    pb.set_message("Building package...");
                }
                PublishStage::CheckingDistribution => {
                    pb.set_position(60);
                    pb.set_message("Checking distribution...");
                }
                PublishStage::Uploading { target } => {
                    pb.set_position(70);
                    pb.set_message(format!("Uploading to {}...", target));
                }
                PublishStage::VerifyingInstall => {
                    pb.set_position(85);
                    pb.set_message("Verifying installation...");
                }
                PublishStage::Complete { version, duration } => {
                    pb.set_position(100);
                    pb.finish_with_message(format!(
                        "Done: v{} ({:.1}s)",
                        version,
                        duration.as_secs_f32()
                    ));
                }
                PublishStage::Failed { stage, error } => {
                    pb.abandon_with_message(format!("Failed at {}: {}", stage, error));
                }
            }
        }
    });

    let publisher = Publisher::new(publish_config, config.clone(), tx);
    let result = if options.verify_only {
        publisher.verify_only().await
    } else {
        publisher.run().await
    };

    // Wait for progress handler
    progress_handle.await?;

    match result {
        Ok(()) => {
            if options.prod && !options.verify_only {
                println!(
                    "\nPublished. Install with: pip install {}",
                    config.project.name
                );
            } else if !options.verify_only {
                println!(
                    "\nPublished to the test index. Try: pip install --index-url {} {}",
                    config.registry.test_index, config.project.name
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("\nError: {}", e);
            Err(e.into())
        }
    }
}

/// Final gate before touching the production index
fn confirm_production(config: &Config) -> Result<bool> {
    print!(
        "Publish {} to the production index? (yes/no): ",
        config.project.name
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
