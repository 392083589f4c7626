//! Project manifest (mcumake.toml) and per-project records
//!
//! A project is one unit of user source code. Its manifest names the target
//! board, pins library versions, and carries property overrides that layer
//! last (highest priority) into the effective configuration. The last
//! resolved configuration is recorded under `.mcumake/` so a rerun can
//! reuse the same selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::properties::PropertyTree;
use crate::error::ManifestError;

/// Manifest file name inside a project directory
pub const MANIFEST_FILE: &str = "mcumake.toml";

/// Directory for per-project mcumake state
pub const STATE_DIR: &str = ".mcumake";

/// File recording the last resolved configuration
pub const LAST_CONFIGURATION_FILE: &str = "last-configuration.toml";

/// The main project manifest (mcumake.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Project metadata
    pub project: ProjectConfig,

    /// Target board reference
    #[serde(default)]
    pub board: BoardRef,

    /// Library name -> version pin ("*" or empty means latest)
    #[serde(default)]
    pub libraries: BTreeMap<String, String>,

    /// Property overrides, layered last into the effective tree
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Project name; also names the linked artifact
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Minimum mcumake version constraint
    #[serde(default)]
    pub mcumake_version: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Board reference in the manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardRef {
    /// Vendor package name, e.g. "arduino"
    pub package: Option<String>,

    /// Platform architecture, e.g. "avr"
    pub platform: Option<String>,

    /// Board identifier, e.g. "uno"
    pub name: Option<String>,

    /// Menu selections: group -> option value
    #[serde(default)]
    pub menu: BTreeMap<String, String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            version: default_version(),
            mcumake_version: None,
        }
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            board: BoardRef::default(),
            libraries: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }
}

impl Manifest {
    /// Load a manifest from a project directory
    pub fn load(project_dir: &Path) -> Result<Self, ManifestError> {
        let path = project_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(ManifestError::NotFound { path });
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ManifestError::Io {
            path: path.clone(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse a manifest from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ManifestError> {
        toml::from_str(content).map_err(|source| ManifestError::Parse { source })
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Version pin for a library name, with "*" and "" treated as unpinned
    pub fn library_pin(&self, name: &str) -> Option<&str> {
        self.libraries
            .get(name)
            .map(String::as_str)
            .filter(|pin| !pin.is_empty() && *pin != "*")
    }

    /// The manifest's property overrides as a tree
    pub fn overrides(&self) -> PropertyTree {
        self.properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// A project rooted at a directory, with its parsed manifest.
#[derive(Debug, Clone)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,
    /// Parsed manifest
    pub manifest: Manifest,
}

impl Project {
    /// Load the project at a directory
    pub fn load(root: &Path) -> Result<Self, ManifestError> {
        Ok(Self {
            root: root.to_path_buf(),
            manifest: Manifest::load(root)?,
        })
    }

    /// Directory searched for project-pool libraries
    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    /// Build output directory
    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Record the last resolved configuration for rerun convenience
    pub fn save_last_configuration(
        &self,
        record: &LastConfiguration,
    ) -> Result<(), ManifestError> {
        let dir = self.root.join(STATE_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| ManifestError::Io {
            path: dir.clone(),
            error: e.to_string(),
        })?;
        let path = dir.join(LAST_CONFIGURATION_FILE);
        let content = toml::to_string_pretty(record).map_err(|e| ManifestError::Io {
            path: path.clone(),
            error: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ManifestError::Io {
            path,
            error: e.to_string(),
        })
    }

    /// Load the last resolved configuration record, if one exists
    pub fn last_configuration(&self) -> Option<LastConfiguration> {
        let path = self.root.join(STATE_DIR).join(LAST_CONFIGURATION_FILE);
        let content = std::fs::read_to_string(path).ok()?;
        toml::from_str(&content).ok()
    }
}

/// Snapshot of the selections that produced the previous build plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastConfiguration {
    /// Vendor package name
    pub package: String,
    /// Platform architecture
    pub platform: String,
    /// Board identifier
    pub board: String,
    /// Menu selections used
    #[serde(default)]
    pub menu: BTreeMap<String, String>,
    /// Library name -> chosen version
    #[serde(default)]
    pub libraries: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[project]
name = "blink"
version = "1.0.0"
mcumake_version = ">=0.1.0"

[board]
package = "arduino"
platform = "avr"
name = "uno"

[board.menu]
cpu = "atmega328"

[libraries]
Servo = "1.8.0"
Wire = "*"

[properties]
"build.extra_flags" = "-DDEBUG"
"#;

    #[test]
    fn test_manifest_parses() {
        let manifest = Manifest::from_toml(SAMPLE).expect("valid manifest");

        assert_eq!(manifest.project.name, "blink");
        assert_eq!(manifest.board.package.as_deref(), Some("arduino"));
        assert_eq!(manifest.board.menu.get("cpu").map(String::as_str), Some("atmega328"));
        assert_eq!(manifest.library_pin("Servo"), Some("1.8.0"));
        assert_eq!(manifest.library_pin("Wire"), None);
        assert_eq!(manifest.overrides().get("build.extra_flags"), Some("-DDEBUG"));
    }

    #[test]
    fn test_minimal_manifest() {
        let manifest = Manifest::from_toml("[project]\nname = \"m\"\n").expect("minimal");
        assert_eq!(manifest.project.name, "m");
        assert_eq!(manifest.project.version, "0.1.0");
        assert!(manifest.board.name.is_none());
        assert!(manifest.libraries.is_empty());
    }

    #[test]
    fn test_manifest_roundtrip() {
        let manifest = Manifest::from_toml(SAMPLE).unwrap();
        let text = manifest.to_toml().expect("serialize");
        let parsed = Manifest::from_toml(&text).expect("reparse");
        assert_eq!(manifest, parsed);
    }

    #[test]
    fn test_missing_project_name_rejected() {
        let result = Manifest::from_toml("[project]\nversion = \"1.0\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_last_configuration_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            "[project]\nname = \"blink\"\n",
        )
        .unwrap();
        let project = Project::load(dir.path()).unwrap();
        assert!(project.last_configuration().is_none());

        let record = LastConfiguration {
            package: "arduino".to_string(),
            platform: "avr".to_string(),
            board: "uno".to_string(),
            menu: BTreeMap::new(),
            libraries: BTreeMap::from([("Servo".to_string(), "1.8.0".to_string())]),
        };
        project.save_last_configuration(&record).unwrap();

        assert_eq!(project.last_configuration(), Some(record));
    }
}
