use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "harvestkit")]
#[command(author, version, about = "Release automation for the TubeHarvest project")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build, validate and upload a release to the package index
    Publish {
        /// Publish to the test index
        #[arg(long, conflicts_with = "prod")]
        test: bool,

        /// Publish to the production index
        #[arg(long)]
        prod: bool,

        /// Skip the test suite
        #[arg(long)]
        skip_tests: bool,

        /// Skip code quality checks
        #[arg(long)]
        skip_checks: bool,

        /// Only verify that the published package installs
        #[arg(long)]
        verify_only: bool,

        /// Answer yes to the production confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Validate package configuration for publishing
    Validate {
        /// Project root to validate
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy the docs directory into the project wiki
    SyncWiki {
        /// Report intended actions without making changes
        #[arg(long)]
        dry_run: bool,

        /// Documentation directory (overrides config)
        #[arg(long)]
        docs: Option<PathBuf>,
    },

    /// Run the CI check suite locally
    Check,

    /// Check external tool availability
    Doctor,

    /// Show configuration
    Config,
}
