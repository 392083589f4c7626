//! CLI command for inspecting effective build properties
//!
//! Implements the `mcumake build-info` command. Resolves a board the same
//! way makegen does and prints the effective property tree, with toolchain
//! paths already substituted in.

use std::path::Path;

use anyhow::{bail, Result};
use regex::Regex;
use serde_json::json;

use crate::cli::output;
use crate::core::catalog::VersionedCatalog;
use crate::core::configuration::{resolve, ResolveRequest};
use crate::core::platform::MenuSelection;
use crate::core::project::Project;
use crate::core::properties::PropertyTree;
use crate::error::McumakeError;
use crate::infra::discovery;

/// Explicit board coordinates from the command line, each falling back to
/// the project manifest.
#[derive(Debug, Default)]
pub struct BoardSelection {
    pub package: Option<String>,
    pub platform: Option<String>,
    pub board: Option<String>,
}

/// Execute the build-info command
pub fn execute(
    packages_dir: &Path,
    project_dir: &Path,
    selection: &BoardSelection,
    filter: Option<&str>,
    json: bool,
) -> Result<()> {
    let filter = filter
        .map(Regex::new)
        .transpose()
        .map_err(|e| McumakeError::Generic(format!("Invalid filter: {e}")))?;

    let env = discovery::load_environment(packages_dir)?;
    let project = Project::load(project_dir).ok();
    let manifest_board = project.as_ref().map(|p| p.manifest.board.clone());

    let package = pick(
        selection.package.clone(),
        manifest_board.as_ref().and_then(|b| b.package.clone()),
        "--package",
    )?;
    let platform = pick(
        selection.platform.clone(),
        manifest_board.as_ref().and_then(|b| b.platform.clone()),
        "--platform",
    )?;
    let board = pick(
        selection.board.clone(),
        manifest_board.as_ref().and_then(|b| b.name.clone()),
        "--board",
    )?;

    // the manifest's menu and overrides only apply to its own board
    let manifest_matches = manifest_board
        .as_ref()
        .is_some_and(|b| b.name.as_deref() == Some(board.as_str()));
    let menu: MenuSelection = if manifest_matches {
        manifest_board.map(|b| b.menu).unwrap_or_default()
    } else {
        MenuSelection::new()
    };
    let overrides = if manifest_matches {
        project
            .as_ref()
            .map(|p| p.manifest.overrides())
            .unwrap_or_default()
    } else {
        PropertyTree::new()
    };
    let project_name = project
        .as_ref()
        .map_or("out", |p| p.manifest.project.name.as_str());

    let project_libraries = VersionedCatalog::new();
    let config = resolve(
        &env,
        &ResolveRequest {
            package: &package,
            platform: &platform,
            board: &board,
            menu: &menu,
            project_name,
            project_overrides: &overrides,
            libraries: &[],
            project_libraries: &project_libraries,
        },
    )?;

    let entries: Vec<(&str, &str)> = config
        .effective()
        .iter()
        .filter(|(key, _)| filter.as_ref().map_or(true, |re| re.is_match(key)))
        .collect();

    if json {
        let properties: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), json!(v)))
            .collect();
        output::print_json(&json!({
            "package": config.package,
            "platform": config.platform,
            "board": config.board,
            "properties": properties,
        }));
        return Ok(());
    }

    for (key, value) in entries {
        println!("{key}={value}");
    }

    Ok(())
}

fn pick(flag: Option<String>, manifest: Option<String>, name: &str) -> Result<String> {
    match flag.or(manifest) {
        Some(value) => Ok(value),
        None => bail!("No board configured. Pass {name} or set [board] in mcumake.toml."),
    }
}
