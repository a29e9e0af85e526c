use anyhow::{bail, Result};
use std::path::Path;

use harvestkit_core::{config::Config, validate::validate_package};

pub async fn run(root: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let report = validate_package(root, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} package validation\n", config.project.name);

        for section in &report.sections {
            println!("[{}]", section.name);
            for check in &section.checks {
                let status = if check.passed { "ok" } else { "FAILED" };
                match &check.detail {
                    Some(detail) if !check.passed => {
                        println!("  {:<24} {}  ({})", check.name, status, detail)
                    }
                    _ => println!("  {:<24} {}", check.name, status),
                }
            }
            println!();
        }

        println!(
            "{} checks, {} passed, {} failed",
            report.total(),
            report.passed_count(),
            report.failed_count()
        );
    }

    if !report.passed() {
        bail!(
            "{} validation issue(s) found, fix before publishing",
            report.failed_count()
        );
    }

    if !json {
        println!("\nReady for publishing. Next: harvestkit publish --test");
    }
    Ok(())
}
