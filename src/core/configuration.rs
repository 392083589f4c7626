//! Configuration resolution
//!
//! [`resolve`] turns a board selection plus project settings into one
//! immutable [`Configuration`]: the effective property tree (platform
//! defaults, board overrides, menu overrides, project overrides, in that
//! fixed order), the chosen library versions, and the selected toolchains.
//! Re-resolving with different inputs produces a new Configuration; one
//! already handed out is never mutated.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::catalog::VersionedCatalog;
use super::library::{resolve_library, Library, LibraryPool, ResolvedLibrary};
use super::package::Environment;
use super::platform::MenuSelection;
use super::properties::PropertyTree;
use crate::error::ResolveError;

/// A toolchain chosen for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedToolchain {
    /// Toolchain name
    pub name: String,
    /// Version the platform asked for
    pub version: String,
    /// Local install path, if installed on this host
    pub path: Option<PathBuf>,
    /// Remote location for fetch guidance, if known
    pub url: Option<String>,
}

/// Inputs to [`resolve`], already validated by the front end.
#[derive(Debug)]
pub struct ResolveRequest<'a> {
    /// Vendor package name
    pub package: &'a str,
    /// Platform architecture
    pub platform: &'a str,
    /// Board identifier
    pub board: &'a str,
    /// Menu selections
    pub menu: &'a MenuSelection,
    /// Project name (names the linked artifact)
    pub project_name: &'a str,
    /// Project property overrides, layered last
    pub project_overrides: &'a PropertyTree,
    /// Required library names with optional version pins
    pub libraries: &'a [(String, Option<String>)],
    /// The project-pool library catalog
    pub project_libraries: &'a VersionedCatalog<Library>,
}

/// The fully resolved, board+project-specific bundle for one build.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Vendor package name
    pub package: String,
    /// Platform architecture
    pub platform: String,
    /// Board identifier
    pub board: String,
    effective: PropertyTree,
    libraries: BTreeMap<String, ResolvedLibrary>,
    toolchains: Vec<SelectedToolchain>,
}

impl Configuration {
    /// The effective property tree
    pub fn effective(&self) -> &PropertyTree {
        &self.effective
    }

    /// Chosen library per required name
    pub fn libraries(&self) -> &BTreeMap<String, ResolvedLibrary> {
        &self.libraries
    }

    /// Selected toolchains, in platform declaration order
    pub fn toolchains(&self) -> &[SelectedToolchain] {
        &self.toolchains
    }
}

/// Resolve a configuration. Fails fast and whole: no partially resolved
/// Configuration is ever returned.
pub fn resolve(
    env: &Environment,
    request: &ResolveRequest<'_>,
) -> Result<Configuration, ResolveError> {
    let package = env
        .package(request.package)
        .ok_or_else(|| ResolveError::PackageNotFound {
            name: request.package.to_string(),
        })?;
    let platform =
        package
            .platform(request.platform)
            .ok_or_else(|| ResolveError::PlatformNotFound {
                package: request.package.to_string(),
                name: request.platform.to_string(),
            })?;
    let board = platform
        .board(request.board)
        .ok_or_else(|| ResolveError::BoardNotFound {
            platform: request.platform.to_string(),
            name: request.board.to_string(),
        })?;

    let mut effective = board
        .build_info(platform.properties(), request.menu)?
        .merge(request.project_overrides);
    effective.set("build.project_name", request.project_name);
    effective.set("runtime.platform.path", &platform.path.display().to_string());

    let mut toolchains = Vec::new();
    for (name, version) in platform.toolchain_refs() {
        let toolchain = package.toolchains().get(&name, &version).ok_or_else(|| {
            ResolveError::ToolchainNotFound {
                name: name.clone(),
                version: version.clone(),
            }
        })?;

        let local_path = toolchain
            .host_toolchain()
            .and_then(|host| host.path.clone());
        let remote_url = toolchain
            .host_toolchain()
            .and_then(|host| host.url.clone());

        if local_path.is_none() && remote_url.is_none() {
            return Err(ResolveError::ToolchainNotFound {
                name: name.clone(),
                version: version.clone(),
            });
        }
        if let Some(ref path) = local_path {
            effective.set(
                &format!("runtime.tools.{name}.path"),
                &path.display().to_string(),
            );
        }
        toolchains.push(SelectedToolchain {
            name,
            version,
            path: local_path,
            url: remote_url,
        });
    }

    let pools = [
        (LibraryPool::System, env.libraries()),
        (LibraryPool::Platform, platform.libraries()),
        (LibraryPool::Project, request.project_libraries),
    ];
    let mut libraries = BTreeMap::new();
    for (name, pin) in request.libraries {
        let resolved = resolve_library(name, pin.as_deref(), &pools)?;
        libraries.insert(name.clone(), resolved);
    }

    Ok(Configuration {
        package: request.package.to_string(),
        platform: request.platform.to_string(),
        board: request.board.to_string(),
        effective,
        libraries,
        toolchains,
    })
}
