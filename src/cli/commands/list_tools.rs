//! CLI command for listing toolchains
//!
//! Implements the `mcumake list-tools` command. For every registered
//! toolchain version it shows the local install path when the toolchain is
//! present on this host, or the remote location a user can fetch it from.

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::cli::output;
use crate::infra::discovery;

/// Execute the list-tools command
pub fn execute(packages_dir: &Path, json: bool) -> Result<()> {
    let env = discovery::load_environment(packages_dir)?;

    if json {
        let mut tools = Vec::new();
        for (vendor, package) in env.packages() {
            for name in package.toolchains().names() {
                for version in package.toolchains().all_versions(name) {
                    let Some(tool) = package.toolchains().get(name, version.as_str()) else {
                        continue;
                    };
                    let host = tool.host_toolchain();
                    tools.push(json!({
                        "package": vendor,
                        "name": name,
                        "version": version.as_str(),
                        "path": host.and_then(|h| h.path.as_ref().map(|p| p.display().to_string())),
                        "url": host.and_then(|h| h.url.clone()),
                    }));
                }
            }
        }
        output::print_json(&json!({ "tools": tools }));
        return Ok(());
    }

    let mut total = 0;
    for (vendor, package) in env.packages() {
        if package.toolchains().is_empty() {
            continue;
        }
        println!("{vendor}:");
        for name in package.toolchains().names() {
            for version in package.toolchains().all_versions(name) {
                let Some(tool) = package.toolchains().get(name, version.as_str()) else {
                    continue;
                };
                total += 1;
                match tool.host_toolchain() {
                    Some(host) if host.path.is_some() => {
                        let path = host.path.as_ref().map(|p| p.display().to_string());
                        println!(
                            "  [tool] {name} {} - {}",
                            version.as_str(),
                            path.unwrap_or_default()
                        );
                    }
                    Some(host) if host.url.is_some() => {
                        println!(
                            "  [tool] {name} {} - not installed, available at {}",
                            version.as_str(),
                            host.url.as_deref().unwrap_or_default()
                        );
                    }
                    _ => {
                        println!(
                            "  [tool] {name} {} - not available for this host",
                            version.as_str()
                        );
                    }
                }
            }
        }
    }

    if total == 0 {
        println!("No toolchains installed under {}.", packages_dir.display());
    }

    Ok(())
}
