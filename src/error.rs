//! Error types for mcumake
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Recipe expansion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    /// A `${token}` placeholder has no value in the effective properties
    #[error("Unresolved reference '${{{token}}}'")]
    UnresolvedReference { token: String },

    /// A token's value refers back to a token already being resolved
    #[error("Cyclic reference: {}", chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    /// Nested substitution exceeded the recursion limit
    #[error("Recursion limit ({limit}) exceeded while resolving '${{{token}}}'")]
    DepthExceeded { token: String, limit: usize },
}

/// Configuration resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Package name not present in the environment
    #[error("Package '{name}' not found")]
    PackageNotFound { name: String },

    /// Platform name not present in the package
    #[error("Platform '{name}' not found in package '{package}'")]
    PlatformNotFound { package: String, name: String },

    /// Board name not present in the platform
    #[error("Board '{name}' not found in platform '{platform}'")]
    BoardNotFound { platform: String, name: String },

    /// Library name not found in any pool
    #[error("Library '{name}' not found")]
    LibraryNotFound { name: String },

    /// Library exists but the pinned version is not available
    #[error("Version {version} of library '{name}' is not available")]
    LibraryVersionNotFound { name: String, version: String },

    /// Required toolchain is neither installed nor known remotely
    #[error(
        "Toolchain '{name}' version {version} is not installed and no remote descriptor is known"
    )]
    ToolchainNotFound { name: String, version: String },

    /// A menu group has no selected value and declares no default
    #[error("Board '{board}' menu '{menu}' has no selection and no default")]
    AmbiguousMenuSelection { board: String, menu: String },

    /// A menu selection names a value the group does not define
    #[error("Board '{board}' menu '{menu}' has no option '{value}'")]
    UnknownMenuOption {
        board: String,
        menu: String,
        value: String,
    },
}

/// Build plan generation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A recipe failed to expand for a given build step
    #[error("Recipe '{recipe}' failed for '{file}': {source}")]
    RecipeFailed {
        recipe: String,
        file: String,
        source: ExpandError,
    },

    /// No recipe pattern exists for a source file's extension
    #[error("No recipe for source file '{file}' (extension '{extension}')")]
    NoRecipeForExtension { file: String, extension: String },
}

/// Package discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Failed to read a property file
    #[error("Failed to read '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Packages root does not exist
    #[error("Packages directory not found: {path}")]
    RootNotFound { path: PathBuf },
}

/// Project manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file missing
    #[error("Manifest not found at '{path}'. Create an mcumake.toml to describe the project.")]
    NotFound { path: PathBuf },

    /// Manifest failed to parse
    #[error("Failed to parse manifest: {source}")]
    Parse { source: toml::de::Error },

    /// IO error reading or writing project files
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Top-level mcumake error type
#[derive(Error, Debug)]
pub enum McumakeError {
    /// Recipe expansion error
    #[error("Expansion error: {0}")]
    Expand(#[from] ExpandError),

    /// Resolution error
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Plan generation error
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Discovery error
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Manifest error
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Version gate error
    #[error("Version error: {0}")]
    Version(#[from] crate::core::version::VersionError),

    /// IO error
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Generic error
    #[error("{0}")]
    Generic(String),
}
