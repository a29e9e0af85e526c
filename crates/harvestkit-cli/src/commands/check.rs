use anyhow::{bail, Result};
use std::path::Path;

use harvestkit_core::{
    checks::{verdict, Gate, QualityChecks},
    config::Config,
};

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let python = config.python_path()?;
    let root = std::env::current_dir()?;

    let checks = QualityChecks::new(
        python,
        root,
        config.project.package_dir.clone(),
        config.project.tests_dir.clone(),
        config.checks.clone(),
    );

    println!("harvestkit check suite\n");

    let outcomes = checks.ci_suite().await?;

    for outcome in &outcomes {
        let status = if outcome.passed {
            "OK"
        } else if outcome.gate == Gate::Blocking {
            "FAILED"
        } else {
            "WARN"
        };
        println!("{:<38} [{:<8}] {}", outcome.name, outcome.gate.to_string(), status);
        if !outcome.passed {
            if let Some(detail) = &outcome.detail {
                for line in detail.lines().take(20) {
                    println!("    {}", line);
                }
            }
        }
    }

    let failed = outcomes.iter().filter(|o| o.breaks_build()).count();
    let warned = outcomes
        .iter()
        .filter(|o| !o.passed && o.gate == Gate::Advisory)
        .count();

    println!();
    if verdict(&outcomes) {
        if warned > 0 {
            println!("All blocking checks passed ({} advisory warnings)", warned);
        } else {
            println!("All checks passed");
        }
        Ok(())
    } else {
        bail!("{} blocking check(s) failed", failed);
    }
}
