//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build_info;
pub mod list_boards;
pub mod list_libraries;
pub mod list_tools;
pub mod makegen;
pub mod which_lib;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every board in every installed platform
    ListBoards,

    /// List installed toolchains and their versions
    ListTools,

    /// List libraries in the system, platform, and project pools
    ListLibraries,

    /// Show which pool and version a library requirement resolves to
    WhichLib {
        /// Library name, optionally with :version
        #[arg(short, long, value_name = "NAME[:VERSION]")]
        library: String,
    },

    /// Show the effective build properties for a board
    BuildInfo {
        /// Vendor package name (defaults to the manifest's board)
        #[arg(long)]
        package: Option<String>,

        /// Platform architecture (defaults to the manifest's board)
        #[arg(long)]
        platform: Option<String>,

        /// Board identifier (defaults to the manifest's board)
        #[arg(long)]
        board: Option<String>,

        /// Only show keys matching this regular expression
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Generate a Makefile for the project
    Makegen {
        /// Output path (defaults to Makefile in the project directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// Execute the command
    pub fn run(self, packages_dir: &Path, project_dir: &Path, json: bool) -> Result<()> {
        match self {
            Self::ListBoards => list_boards::execute(packages_dir, json),
            Self::ListTools => list_tools::execute(packages_dir, json),
            Self::ListLibraries => list_libraries::execute(packages_dir, project_dir, json),
            Self::WhichLib { library } => {
                which_lib::execute(packages_dir, project_dir, &library, json)
            }
            Self::BuildInfo {
                package,
                platform,
                board,
                filter,
            } => {
                let selection = build_info::BoardSelection {
                    package,
                    platform,
                    board,
                };
                build_info::execute(
                    packages_dir,
                    project_dir,
                    &selection,
                    filter.as_deref(),
                    json,
                )
            }
            Self::Makegen { output } => makegen::execute(packages_dir, project_dir, output),
        }
    }
}
