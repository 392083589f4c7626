//! CLI command for listing boards
//!
//! Implements the `mcumake list-boards` command.

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::cli::output;
use crate::infra::discovery;

/// Execute the list-boards command
pub fn execute(packages_dir: &Path, json: bool) -> Result<()> {
    let env = discovery::load_environment(packages_dir)?;

    if json {
        let mut boards = Vec::new();
        for (vendor, package) in env.packages() {
            for (arch, platform) in package.platforms() {
                for (id, board) in platform.boards() {
                    boards.push(json!({
                        "package": vendor,
                        "platform": arch,
                        "platform_name": platform.name,
                        "id": id,
                        "name": board.name,
                        "menus": board.menus().keys().collect::<Vec<_>>(),
                    }));
                }
            }
        }
        output::print_json(&json!({ "boards": boards }));
        return Ok(());
    }

    let mut total = 0;
    for (vendor, package) in env.packages() {
        for (arch, platform) in package.platforms() {
            println!("{} ({vendor}:{arch} {})", platform.name, platform.version);
            for (id, board) in platform.boards() {
                total += 1;
                if board.menus().is_empty() {
                    println!("  [board] {id} - {}", board.name);
                } else {
                    let menus: Vec<&str> =
                        board.menus().keys().map(String::as_str).collect();
                    println!(
                        "  [board] {id} - {} (menus: {})",
                        board.name,
                        menus.join(", ")
                    );
                }
            }
            println!();
        }
    }

    if total == 0 {
        println!("No boards installed under {}.", packages_dir.display());
    } else {
        println!("{total} board(s) available.");
    }

    Ok(())
}
