//! Package discovery
//!
//! Walks an installed packages root into an [`Environment`]. The expected
//! layout mirrors vendor SDK installs:
//!
//! ```text
//! <root>/packages/<vendor>/hardware/<arch>/<version>/platform.txt
//!                                                   /boards.txt
//!                                                   /libraries/<name>/
//! <root>/packages/<vendor>/tools/<name>/<version>/
//! <root>/libraries/<name>/            (system library pool)
//! ```
//!
//! When several versions of one platform are installed, the highest one is
//! used. Core modules never see these paths directly; they get the
//! assembled, immutable models.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::catalog::LooseVersion;
use crate::core::library::Library;
use crate::core::package::{current_host, Environment, HostToolchain, Package, Toolchain};
use crate::core::platform::Platform;
use crate::core::properties::PropertyTree;
use crate::error::DiscoveryError;

/// Platform definition file name
pub const PLATFORM_FILE: &str = "platform.txt";

/// Board definitions file name
pub const BOARDS_FILE: &str = "boards.txt";

/// Library metadata file name
pub const LIBRARY_FILE: &str = "library.properties";

/// Default packages root under the user's home directory
pub fn default_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mcumake")
}

/// Load every package and system library under a root directory.
pub fn load_environment(root: &Path) -> Result<Environment, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut env = Environment::new();
    for vendor_dir in sorted_dirs(&root.join("packages")) {
        let vendor = dir_name(&vendor_dir);
        debug!(vendor = %vendor, "loading package");
        env.add_package(load_package(&vendor, &vendor_dir)?);
    }
    for library in load_libraries(&root.join("libraries"))? {
        debug!(library = %library.name, version = %library.version, "system library");
        env.add_system_library(library);
    }
    Ok(env)
}

fn load_package(vendor: &str, vendor_dir: &Path) -> Result<Package, DiscoveryError> {
    let mut package = Package::new(vendor);

    for arch_dir in sorted_dirs(&vendor_dir.join("hardware")) {
        let arch = dir_name(&arch_dir);
        if let Some((version, platform_dir)) = highest_version_dir(&arch_dir) {
            package.add_platform(load_platform(vendor, &arch, &version, &platform_dir)?);
        }
    }

    for tool_dir in sorted_dirs(&vendor_dir.join("tools")) {
        let tool = dir_name(&tool_dir);
        for version_dir in sorted_dirs(&tool_dir) {
            let version = dir_name(&version_dir);
            package.add_toolchain(
                Toolchain::new(&tool, &version)
                    .with_host(HostToolchain::local(&current_host(), version_dir)),
            );
        }
    }

    Ok(package)
}

fn load_platform(
    vendor: &str,
    arch: &str,
    version: &str,
    platform_dir: &Path,
) -> Result<Platform, DiscoveryError> {
    let properties = read_properties(&platform_dir.join(PLATFORM_FILE))?;
    let mut platform = Platform::new(
        vendor,
        arch,
        version,
        platform_dir.to_path_buf(),
        properties,
    );

    let boards_path = platform_dir.join(BOARDS_FILE);
    if boards_path.is_file() {
        platform.load_boards(&read_properties(&boards_path)?);
    }
    for library in load_libraries(&platform_dir.join("libraries"))? {
        platform.add_library(library);
    }

    debug!(
        platform = %platform.name,
        arch = %arch,
        boards = platform.boards().len(),
        "loaded platform"
    );
    Ok(platform)
}

/// Load every library directory under a pool directory. A missing pool is
/// an empty pool.
pub fn load_libraries(pool_dir: &Path) -> Result<Vec<Library>, DiscoveryError> {
    let mut libraries = Vec::new();
    for library_dir in sorted_dirs(pool_dir) {
        let metadata_path = library_dir.join(LIBRARY_FILE);
        let metadata = if metadata_path.is_file() {
            read_properties(&metadata_path)?
        } else {
            PropertyTree::new()
        };
        let fallback = dir_name(&library_dir);
        let name = metadata.get("name").unwrap_or(&fallback).to_string();
        let version = metadata.get("version").unwrap_or("1.0").to_string();

        let src = library_dir.join("src");
        let (src_dirs, header_dirs) = if src.is_dir() {
            (vec![src.clone()], vec![src])
        } else {
            (vec![library_dir.clone()], vec![library_dir.clone()])
        };
        libraries.push(Library {
            name,
            version,
            root: library_dir,
            src_dirs,
            header_dirs,
        });
    }
    Ok(libraries)
}

/// Parse a key=value property file
pub fn read_properties(path: &Path) -> Result<PropertyTree, DiscoveryError> {
    let content = std::fs::read_to_string(path).map_err(|e| DiscoveryError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(PropertyTree::parse(&content))
}

/// Non-hidden subdirectories of a directory, sorted by name. A missing
/// directory yields nothing.
fn sorted_dirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| !name.starts_with('.'))
        })
        .collect();
    dirs.sort();
    dirs
}

/// Pick the highest-versioned subdirectory, by loose version ordering of
/// the directory names.
fn highest_version_dir(dir: &Path) -> Option<(String, PathBuf)> {
    sorted_dirs(dir)
        .into_iter()
        .map(|path| (dir_name(&path), path))
        .max_by(|(a, _), (b, _)| LooseVersion::parse(a).cmp(&LooseVersion::parse(b)))
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}
