//! CLI command for locating a library
//!
//! Implements the `mcumake which-lib` command. Resolves one requirement
//! string exactly the way makegen would, and reports the winning pool,
//! version, and path.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::cli::output;
use crate::core::catalog::VersionedCatalog;
use crate::core::library::{resolve_library, Library, LibraryPool};
use crate::core::project::Project;
use crate::infra::discovery;

/// Execute the which-lib command
pub fn execute(packages_dir: &Path, project_dir: &Path, spec: &str, json: bool) -> Result<()> {
    let env = discovery::load_environment(packages_dir)?;
    let (name, pin) = Library::split_spec(spec);

    // the platform pool only exists once the project names a board
    let platform_pool = match Project::load(project_dir) {
        Ok(project) => {
            let board = &project.manifest.board;
            match (board.package.as_deref(), board.platform.as_deref()) {
                (Some(vendor), Some(arch)) => env
                    .package(vendor)
                    .and_then(|p| p.platform(arch))
                    .map(|p| p.libraries().clone()),
                _ => None,
            }
        }
        Err(_) => None,
    };

    let mut project_pool = VersionedCatalog::new();
    for library in discovery::load_libraries(&project_dir.join("libraries"))? {
        let (name, version) = (library.name.clone(), library.version.clone());
        project_pool.put(&name, &version, library);
    }

    let empty = VersionedCatalog::new();
    let pools = [
        (LibraryPool::System, env.libraries()),
        (LibraryPool::Platform, platform_pool.as_ref().unwrap_or(&empty)),
        (LibraryPool::Project, &project_pool),
    ];

    let resolved = resolve_library(name, pin, &pools)
        .with_context(|| format!("Cannot resolve library requirement '{spec}'"))?;

    if json {
        output::print_json(&json!({
            "name": resolved.library.name,
            "version": resolved.library.version,
            "pool": resolved.pool.to_string(),
            "path": resolved.library.root.display().to_string(),
        }));
        return Ok(());
    }

    println!(
        "{} ({} pool) - {}",
        resolved.library.name_and_version(),
        resolved.pool,
        resolved.library.root.display()
    );

    Ok(())
}
