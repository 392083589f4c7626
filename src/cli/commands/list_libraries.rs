//! CLI command for listing libraries
//!
//! Implements the `mcumake list-libraries` command. Shows every library in
//! each of the three pools, in the order resolution searches them.

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::cli::output;
use crate::core::catalog::VersionedCatalog;
use crate::core::library::Library;
use crate::infra::discovery;

/// Execute the list-libraries command
pub fn execute(packages_dir: &Path, project_dir: &Path, json: bool) -> Result<()> {
    let env = discovery::load_environment(packages_dir)?;

    let mut pools: Vec<(String, Vec<&Library>)> = Vec::new();
    pools.push(("system".to_string(), catalog_entries(env.libraries())));
    for (vendor, package) in env.packages() {
        for (arch, platform) in package.platforms() {
            pools.push((
                format!("platform {vendor}:{arch}"),
                catalog_entries(platform.libraries()),
            ));
        }
    }
    let project_pool = discovery::load_libraries(&project_dir.join("libraries"))?;
    pools.push((
        "project".to_string(),
        project_pool.iter().collect(),
    ));

    if json {
        let rendered: Vec<serde_json::Value> = pools
            .iter()
            .map(|(pool, libraries)| {
                json!({
                    "pool": pool,
                    "libraries": libraries
                        .iter()
                        .map(|lib| json!({
                            "name": lib.name,
                            "version": lib.version,
                            "path": lib.root.display().to_string(),
                        }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        output::print_json(&json!({ "pools": rendered }));
        return Ok(());
    }

    for (pool, libraries) in &pools {
        println!("{pool}:");
        if libraries.is_empty() {
            println!("  (empty)");
        }
        for library in libraries {
            println!(
                "  [lib] {} - {}",
                library.name_and_version(),
                library.root.display()
            );
        }
        println!();
    }

    Ok(())
}

/// Every library version in a catalog, newest first within each name.
fn catalog_entries(catalog: &VersionedCatalog<Library>) -> Vec<&Library> {
    let mut entries = Vec::new();
    for name in catalog.names() {
        for version in catalog.all_versions(name) {
            if let Some(library) = catalog.get(name, version.as_str()) {
                entries.push(library);
            }
        }
    }
    entries
}
