use anyhow::Result;
use std::path::Path;

use harvestkit_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("harvestkit configuration\n");

    println!("[project]");
    println!("  name = {:?}", config.project.name);
    println!("  package_dir = {:?}", config.project.package_dir);
    println!("  descriptor = {:?}", config.project.descriptor);
    println!("  dist_dir = {:?}", config.project.dist_dir);
    println!("  tests_dir = {:?}", config.project.tests_dir);

    println!("\n[registry]");
    println!("  production_url = {:?}", config.registry.production_url);
    println!("  test_url = {:?}", config.registry.test_url);
    println!("  production_index = {:?}", config.registry.production_index);
    println!("  test_index = {:?}", config.registry.test_index);
    println!(
        "  production_token_env = {:?}",
        config.registry.production_token_env
    );
    println!("  test_token_env = {:?}", config.registry.test_token_env);

    println!("\n[wiki]");
    println!("  repo_url = {:?}", config.wiki.repo_url);
    println!("  docs_dir = {:?}", config.wiki.docs_dir);
    if let Some(ref dir) = config.wiki.checkout_dir {
        println!("  checkout_dir = {:?}", dir);
    } else {
        println!("  checkout_dir = (temp clone)");
    }
    println!("  author_name = {:?}", config.wiki.author_name);
    println!("  author_email = {:?}", config.wiki.author_email);

    println!("\n[checks]");
    println!(
        "  blocking_selectors = {:?}",
        config.checks.blocking_selectors
    );
    println!("  max_line_length = {}", config.checks.max_line_length);
    println!("  max_complexity = {}", config.checks.max_complexity);

    println!("\n[paths]");
    if let Some(ref p) = config.paths.python {
        println!("  python = {:?}", p);
    } else {
        println!("  python = (auto-detect)");
    }
    if let Some(ref p) = config.paths.git {
        println!("  git = {:?}", p);
    } else {
        println!("  git = (auto-detect)");
    }

    println!("\n[temp]");
    println!("  cleanup = {}", config.temp.cleanup);
    if let Some(ref d) = config.temp.directory {
        println!("  directory = {:?}", d);
    } else {
        println!("  directory = (system temp)");
    }

    // Show config file locations
    println!("\nConfig file locations (in priority order):");
    if let Some(p) = config_path {
        println!("  1. {} (specified)", p.display());
    }
    if let Some(config_dir) = dirs::config_dir() {
        println!("  2. {}/harvestkit/config.toml", config_dir.display());
    }
    println!("  3. Environment variables (HARVESTKIT_*)");

    Ok(())
}
