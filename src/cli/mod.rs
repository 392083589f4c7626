//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::infra::discovery;
use commands::Commands;

/// Mcumake - Makefile generator for embedded board packages
///
/// Resolves board build configurations from installed vendor packages and
/// generates self-contained Makefiles.
#[derive(Parser, Debug)]
#[command(name = "mcumake")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Root directory of installed packages
    #[arg(long, env = "MCUMAKE_PACKAGES", global = true)]
    pub packages_dir: Option<PathBuf>,

    /// Project directory containing mcumake.toml
    #[arg(long, default_value = ".", global = true)]
    pub project_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let packages_dir = self
            .packages_dir
            .unwrap_or_else(discovery::default_root);

        if let Some(cmd) = self.command {
            cmd.run(&packages_dir, &self.project_dir, self.json)
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
