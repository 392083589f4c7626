//! Vendor package model
//!
//! A [`Package`] is one vendor's bundle of platforms and toolchains, built
//! once from discovered property files and immutable afterwards. The
//! [`Environment`] is the explicit, owned root object holding every
//! discovered package plus the system library pool; it is created per run
//! and passed by reference, never held as global state.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::catalog::VersionedCatalog;
use super::library::Library;
use super::platform::Platform;

/// Name of the host this process runs on, in `arch-os` form.
pub fn current_host() -> String {
    format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS)
}

/// Per-host install descriptor for one toolchain version.
///
/// Either a discovered local install path, or a remote location the user can
/// fetch from. A missing local path is a normal outcome, not an error: it
/// means "not installed, here is where to get it".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostToolchain {
    /// Host identifier, e.g. "x86_64-linux"
    pub host: String,
    /// Local install path, if the toolchain is installed for this host
    pub path: Option<PathBuf>,
    /// Remote location for user-facing fetch guidance
    pub url: Option<String>,
}

impl HostToolchain {
    /// Descriptor for a locally installed toolchain
    pub fn local(host: &str, path: PathBuf) -> Self {
        Self {
            host: host.to_string(),
            path: Some(path),
            url: None,
        }
    }

    /// Descriptor for a known-but-not-installed toolchain
    pub fn remote(host: &str, url: &str) -> Self {
        Self {
            host: host.to_string(),
            path: None,
            url: Some(url.to_string()),
        }
    }
}

/// A named, versioned compiler/linker/uploader suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Toolchain name, e.g. "avr-gcc"
    pub name: String,
    /// Version string as discovered
    pub version: String,
    /// Install descriptors keyed by host identifier
    hosts: BTreeMap<String, HostToolchain>,
}

impl Toolchain {
    /// Create a toolchain with no host descriptors yet
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            hosts: BTreeMap::new(),
        }
    }

    /// Attach a host descriptor
    #[must_use]
    pub fn with_host(mut self, host: HostToolchain) -> Self {
        self.hosts.insert(host.host.clone(), host);
        self
    }

    /// Descriptor for the current host, or none if this toolchain knows
    /// nothing about it.
    pub fn host_toolchain(&self) -> Option<&HostToolchain> {
        self.hosts.get(&current_host())
    }

    /// Descriptor for an explicit host name
    pub fn host_toolchain_for(&self, host: &str) -> Option<&HostToolchain> {
        self.hosts.get(host)
    }
}

/// One vendor's bundle of platforms and toolchains.
#[derive(Debug, Clone)]
pub struct Package {
    /// Vendor name, e.g. "arduino"
    pub name: String,
    platforms: BTreeMap<String, Platform>,
    toolchains: VersionedCatalog<Toolchain>,
}

impl Package {
    /// Create an empty package
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            platforms: BTreeMap::new(),
            toolchains: VersionedCatalog::new(),
        }
    }

    /// Add a platform. Used during assembly only; packages are immutable
    /// once discovery hands them out.
    pub fn add_platform(&mut self, platform: Platform) {
        self.platforms.insert(platform.architecture.clone(), platform);
    }

    /// Register a toolchain version
    pub fn add_toolchain(&mut self, toolchain: Toolchain) {
        let (name, version) = (toolchain.name.clone(), toolchain.version.clone());
        self.toolchains.put(&name, &version, toolchain);
    }

    /// Platforms keyed by architecture identifier
    pub fn platforms(&self) -> &BTreeMap<String, Platform> {
        &self.platforms
    }

    /// Look up a platform by architecture
    pub fn platform(&self, architecture: &str) -> Option<&Platform> {
        self.platforms.get(architecture)
    }

    /// Toolchain catalog for this package
    pub fn toolchains(&self) -> &VersionedCatalog<Toolchain> {
        &self.toolchains
    }
}

/// Every discovered package plus the system library pool.
///
/// Built once per invocation by discovery, then only read.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    packages: BTreeMap<String, Package>,
    system_libraries: VersionedCatalog<Library>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a discovered package
    pub fn add_package(&mut self, package: Package) {
        self.packages.insert(package.name.clone(), package);
    }

    /// Register a system library version
    pub fn add_system_library(&mut self, library: Library) {
        let (name, version) = (library.name.clone(), library.version.clone());
        self.system_libraries.put(&name, &version, library);
    }

    /// All packages, keyed by vendor name
    pub fn packages(&self) -> &BTreeMap<String, Package> {
        &self.packages
    }

    /// Look up a package by vendor name
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// The system library pool
    pub fn libraries(&self) -> &VersionedCatalog<Library> {
        &self.system_libraries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_toolchain_lookup() {
        let host = current_host();
        let tool = Toolchain::new("avr-gcc", "7.3.0")
            .with_host(HostToolchain::local(&host, PathBuf::from("/opt/avr-gcc")))
            .with_host(HostToolchain::remote(
                "sparc-solaris",
                "https://example.com/avr-gcc.tar.gz",
            ));

        let local = tool.host_toolchain().expect("current host registered");
        assert_eq!(local.path, Some(PathBuf::from("/opt/avr-gcc")));

        let remote = tool.host_toolchain_for("sparc-solaris").unwrap();
        assert!(remote.path.is_none());
        assert!(remote.url.is_some());
    }

    #[test]
    fn test_host_toolchain_absent_is_none() {
        let tool = Toolchain::new("avr-gcc", "7.3.0");
        assert!(tool.host_toolchain_for("riscv-plan9").is_none());
    }

    #[test]
    fn test_package_toolchain_catalog() {
        let mut package = Package::new("arduino");
        package.add_toolchain(Toolchain::new("avr-gcc", "5.4.0"));
        package.add_toolchain(Toolchain::new("avr-gcc", "7.3.0"));

        let latest = package.toolchains().latest("avr-gcc").unwrap();
        assert_eq!(latest.version, "7.3.0");
        assert!(package.toolchains().get("avr-gcc", "5.4.0").is_some());
    }
}
