mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "harvestkit=info",
        1 => "harvestkit=debug",
        2 => "harvestkit=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Some(Commands::Publish {
            test,
            prod,
            skip_tests,
            skip_checks,
            verify_only,
            yes,
        }) => {
            let options = commands::publish::PublishOptions {
                test,
                prod,
                skip_tests,
                skip_checks,
                verify_only,
                yes,
            };
            commands::publish::run(&options, cli.config.as_deref()).await
        }
        Some(Commands::Validate { root, json }) => {
            commands::validate::run(&root, json, cli.config.as_deref()).await
        }
        Some(Commands::SyncWiki { dry_run, docs }) => {
            commands::sync_wiki::run(dry_run, docs.as_deref(), cli.config.as_deref()).await
        }
        Some(Commands::Check) => commands::check::run(cli.config.as_deref()).await,
        Some(Commands::Doctor) => commands::doctor::run(cli.config.as_deref()).await,
        Some(Commands::Config) => commands::config::run(cli.config.as_deref()).await,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
