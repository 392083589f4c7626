//! Library model and pool resolution
//!
//! Libraries live in three independent pools: system, platform, and
//! project. When a required name is ambiguous across pools, the first pool
//! containing it wins, searched in that order. Libraries of the same name
//! from different pools are never merged.

use std::fmt;
use std::path::PathBuf;

use super::catalog::VersionedCatalog;
use crate::error::ResolveError;

/// A named, versioned source library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    /// Library name
    pub name: String,
    /// Version string as declared in library.properties
    pub version: String,
    /// Install location on disk
    pub root: PathBuf,
    /// Directories holding compilable sources
    pub src_dirs: Vec<PathBuf>,
    /// Directories to put on the include path
    pub header_dirs: Vec<PathBuf>,
}

impl Library {
    /// Create a flat-layout library whose root holds both sources and
    /// headers.
    pub fn flat(name: &str, version: &str, root: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            src_dirs: vec![root.clone()],
            header_dirs: vec![root.clone()],
            root,
        }
    }

    /// "name version" display form used by listings
    pub fn name_and_version(&self) -> String {
        format!("{} {}", self.name, self.version)
    }

    /// Split a "name" or "name:version" requirement string
    pub fn split_spec(spec: &str) -> (&str, Option<&str>) {
        match spec.split_once(':') {
            Some((name, version)) if !version.is_empty() => (name, Some(version)),
            Some((name, _)) => (name, None),
            None => (spec, None),
        }
    }
}

/// Which pool a resolved library came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LibraryPool {
    System,
    Platform,
    Project,
}

impl fmt::Display for LibraryPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::Platform => f.write_str("platform"),
            Self::Project => f.write_str("project"),
        }
    }
}

/// A concrete library choice for one required name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLibrary {
    /// Pool the winning entry came from
    pub pool: LibraryPool,
    /// The chosen library version
    pub library: Library,
}

/// Resolve one required library name against the three pools.
///
/// Pools are searched system, platform, project; the first pool containing
/// the name wins and later pools are not consulted, even if the pin only
/// matches there. A pinned version requires an exact match within the
/// winning pool.
pub fn resolve_library(
    name: &str,
    pin: Option<&str>,
    pools: &[(LibraryPool, &VersionedCatalog<Library>)],
) -> Result<ResolvedLibrary, ResolveError> {
    let Some((pool, catalog)) = pools
        .iter()
        .find(|(_, catalog)| catalog.contains(name))
    else {
        return Err(ResolveError::LibraryNotFound {
            name: name.to_string(),
        });
    };

    let library = match pin {
        Some(version) => {
            catalog
                .get(name, version)
                .ok_or_else(|| ResolveError::LibraryVersionNotFound {
                    name: name.to_string(),
                    version: version.to_string(),
                })?
        }
        None => catalog
            .latest(name)
            .ok_or_else(|| ResolveError::LibraryNotFound {
                name: name.to_string(),
            })?,
    };

    Ok(ResolvedLibrary {
        pool: *pool,
        library: library.clone(),
    })
}
