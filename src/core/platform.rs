//! Platform and board models
//!
//! A [`Platform`] holds one architecture's default build properties and
//! recipe templates plus its board list. A [`Board`] layers its own
//! overrides and optional menu-driven overrides on top. The effective
//! properties of a board are always
//! platform defaults + board overrides + selected menu overrides, applied
//! in that exact order.

use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::catalog::VersionedCatalog;
use super::library::Library;
use super::properties::PropertyTree;
use crate::error::ResolveError;

/// Menu selection for one build: group identifier -> chosen option value.
pub type MenuSelection = BTreeMap<String, String>;

/// One selectable option inside a menu group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    /// Human-readable label, e.g. "ATmega328P"
    pub label: String,
    /// Property overrides this option layers onto the board
    pub overrides: PropertyTree,
}

/// A named option group on a board, e.g. "cpu".
///
/// The reserved key `default` inside a group declares the option chosen
/// when the user selects nothing. A group without a default and without an
/// explicit selection is ambiguous and fails resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    /// Group identifier
    pub id: String,
    /// Human-readable title, e.g. "Processor"
    pub title: String,
    /// Declared default option value, if any
    pub default: Option<String>,
    /// Option value -> option definition
    pub options: BTreeMap<String, MenuOption>,
}

/// One concrete device configuration within a platform.
#[derive(Debug, Clone)]
pub struct Board {
    /// Board identifier, e.g. "uno"
    pub id: String,
    /// Human-readable name, e.g. "Arduino Uno"
    pub name: String,
    /// Property overrides layered on top of the platform defaults
    overrides: PropertyTree,
    /// Menu groups, keyed by group identifier
    menus: BTreeMap<String, Menu>,
    /// Effective-property memo keyed by the defaults fingerprint plus the
    /// canonical resolved selection. A different input pair is a logically
    /// distinct tree, never a mutation of a cached one.
    build_info: RefCell<BTreeMap<String, PropertyTree>>,
}

impl Board {
    /// Build a board from its slice of a boards file.
    ///
    /// `tree` holds the board's keys with the board identifier already
    /// stripped: `name=...`, `build.mcu=...`, `menu.cpu.atmega328=...`.
    /// `menu_titles` maps group identifiers to titles from the file's
    /// top-level `menu.*` keys.
    pub fn from_tree(id: &str, tree: &PropertyTree, menu_titles: &PropertyTree) -> Self {
        let mut overrides = PropertyTree::new();
        for (key, value) in tree.iter() {
            if key != "name" && !key.starts_with("menu.") {
                overrides.set(key, value);
            }
        }

        let menu_tree = tree.sub_tree("menu");
        let mut menus = BTreeMap::new();
        for group in menu_tree.first_segments() {
            let group_tree = menu_tree.sub_tree(&group);
            let mut default = None;
            let mut options = BTreeMap::new();
            for value in group_tree.first_segments() {
                if value == "default" {
                    if let Some(chosen) = group_tree.get("default") {
                        default = Some(chosen.to_string());
                    }
                    continue;
                }
                options.insert(
                    value.clone(),
                    MenuOption {
                        label: group_tree.get(&value).unwrap_or(&value).to_string(),
                        overrides: group_tree.sub_tree(&value),
                    },
                );
            }
            let title = menu_titles.get(&group).unwrap_or(&group).to_string();
            menus.insert(
                group.clone(),
                Menu {
                    id: group,
                    title,
                    default,
                    options,
                },
            );
        }

        Self {
            id: id.to_string(),
            name: tree.get("name").unwrap_or(id).to_string(),
            overrides,
            menus,
            build_info: RefCell::new(BTreeMap::new()),
        }
    }

    /// The board's own overrides, menu keys excluded
    pub fn overrides(&self) -> &PropertyTree {
        &self.overrides
    }

    /// Menu groups, keyed by group identifier
    pub fn menus(&self) -> &BTreeMap<String, Menu> {
        &self.menus
    }

    /// Effective flat properties for this board under a menu selection.
    ///
    /// Computed lazily on first request per distinct (defaults, selection)
    /// pair and cached for the board's lifetime. Fails if a menu group is
    /// neither selected nor defaulted, or if a selection names an unknown
    /// option.
    pub fn build_info(
        &self,
        platform_defaults: &PropertyTree,
        selection: &MenuSelection,
    ) -> Result<PropertyTree, ResolveError> {
        let resolved = self.resolve_selection(selection)?;
        let selection_key = resolved
            .iter()
            .map(|(group, value)| format!("{group}={value}"))
            .collect::<Vec<_>>()
            .join(",");
        // the same board can be asked about under different defaults, so
        // the memo key has to cover both inputs
        let key = format!("{}|{selection_key}", fingerprint(platform_defaults));

        if let Some(cached) = self.build_info.borrow().get(&key) {
            return Ok(cached.clone());
        }

        let base = platform_defaults.merge(&self.overrides);
        let overlays: Vec<&PropertyTree> = resolved
            .iter()
            .map(|(group, value)| &self.menus[group].options[value].overrides)
            .collect();
        let effective = PropertyTree::merge_layers(&base, overlays);

        self.build_info
            .borrow_mut()
            .insert(key, effective.clone());
        Ok(effective)
    }

    /// Pick one option per menu group, taking the explicit selection first
    /// and the declared default second.
    fn resolve_selection(
        &self,
        selection: &MenuSelection,
    ) -> Result<BTreeMap<String, String>, ResolveError> {
        let mut resolved = BTreeMap::new();
        for (group, menu) in &self.menus {
            let chosen = selection
                .get(group)
                .map(String::as_str)
                .or(menu.default.as_deref());
            let Some(value) = chosen else {
                return Err(ResolveError::AmbiguousMenuSelection {
                    board: self.id.clone(),
                    menu: group.clone(),
                });
            };
            if !menu.options.contains_key(value) {
                return Err(ResolveError::UnknownMenuOption {
                    board: self.id.clone(),
                    menu: group.clone(),
                    value: value.to_string(),
                });
            }
            resolved.insert(group.clone(), value.to_string());
        }
        Ok(resolved)
    }
}

/// Short content hash of a property tree, used to key the build-info memo.
fn fingerprint(tree: &PropertyTree) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in tree.iter() {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(&hasher.finalize()[..8])
}

/// One target architecture's build rules and board list within a package.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Platform display name from platform.txt
    pub name: String,
    /// Architecture identifier, e.g. "avr"
    pub architecture: String,
    /// Platform version as discovered
    pub version: String,
    /// Owning package's vendor name
    pub package: String,
    /// Install location of this platform version
    pub path: PathBuf,
    /// Default build properties and recipe templates (platform.txt)
    properties: PropertyTree,
    boards: BTreeMap<String, Board>,
    libraries: VersionedCatalog<Library>,
}

impl Platform {
    /// Create a platform from its parsed platform.txt tree
    pub fn new(
        package: &str,
        architecture: &str,
        version: &str,
        path: PathBuf,
        properties: PropertyTree,
    ) -> Self {
        Self {
            name: properties
                .get("name")
                .unwrap_or(architecture)
                .to_string(),
            architecture: architecture.to_string(),
            version: version.to_string(),
            package: package.to_string(),
            path,
            properties,
            boards: BTreeMap::new(),
            libraries: VersionedCatalog::new(),
        }
    }

    /// Populate boards from a parsed boards file tree.
    ///
    /// Top-level `menu.<group>=<title>` keys declare menu titles; every
    /// other first segment is a board identifier.
    pub fn load_boards(&mut self, boards_tree: &PropertyTree) {
        let menu_titles = boards_tree.sub_tree("menu");
        for id in boards_tree.first_segments() {
            if id == "menu" {
                continue;
            }
            let board = Board::from_tree(&id, &boards_tree.sub_tree(&id), &menu_titles);
            self.boards.insert(id, board);
        }
    }

    /// Register a bundled platform library version
    pub fn add_library(&mut self, library: Library) {
        let (name, version) = (library.name.clone(), library.version.clone());
        self.libraries.put(&name, &version, library);
    }

    /// Default build properties and recipe templates
    pub fn properties(&self) -> &PropertyTree {
        &self.properties
    }

    /// Boards keyed by identifier
    pub fn boards(&self) -> &BTreeMap<String, Board> {
        &self.boards
    }

    /// Look up a board by identifier
    pub fn board(&self, id: &str) -> Option<&Board> {
        self.boards.get(id)
    }

    /// The platform library pool
    pub fn libraries(&self) -> &VersionedCatalog<Library> {
        &self.libraries
    }

    /// Toolchain references declared in platform.txt as
    /// `toolchain.<name>.version=<v>` keys, in name order.
    pub fn toolchain_refs(&self) -> Vec<(String, String)> {
        let tree = self.properties.sub_tree("toolchain");
        tree.first_segments()
            .into_iter()
            .filter_map(|name| {
                tree.get(&format!("{name}.version"))
                    .map(|version| (name, version.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_boards_tree() -> PropertyTree {
        PropertyTree::parse(
            "menu.cpu=Processor\n\
             uno.name=Arduino Uno\n\
             uno.build.mcu=atmega328p\n\
             uno.build.f_cpu=16000000L\n\
             mini.name=Arduino Mini\n\
             mini.build.f_cpu=16000000L\n\
             mini.menu.cpu.default=atmega328\n\
             mini.menu.cpu.atmega328=ATmega328P\n\
             mini.menu.cpu.atmega328.build.mcu=atmega328p\n\
             mini.menu.cpu.atmega168=ATmega168\n\
             mini.menu.cpu.atmega168.build.mcu=atmega168\n",
        )
    }

    fn sample_platform() -> Platform {
        let properties = PropertyTree::parse(
            "name=AVR Boards\n\
             build.arch=AVR\n\
             toolchain.avr-gcc.version=7.3.0\n",
        );
        let mut platform = Platform::new(
            "arduino",
            "avr",
            "1.8.6",
            PathBuf::from("/pkgs/arduino/hardware/avr/1.8.6"),
            properties,
        );
        platform.load_boards(&sample_boards_tree());
        platform
    }

    #[test]
    fn test_boards_enumerated_without_menu_titles() {
        let platform = sample_platform();
        let ids: Vec<&str> = platform.boards().keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["mini", "uno"]);
        assert_eq!(platform.board("uno").unwrap().name, "Arduino Uno");
    }

    #[test]
    fn test_effective_properties_layering_order() {
        let platform = sample_platform();
        let board = platform.board("mini").unwrap();

        let mut selection = MenuSelection::new();
        selection.insert("cpu".to_string(), "atmega168".to_string());
        let info = board
            .build_info(platform.properties(), &selection)
            .unwrap();

        // platform default survives
        assert_eq!(info.get("build.arch"), Some("AVR"));
        // board override survives
        assert_eq!(info.get("build.f_cpu"), Some("16000000L"));
        // menu override wins last
        assert_eq!(info.get("build.mcu"), Some("atmega168"));
    }

    #[test]
    fn test_menu_default_applies_when_unselected() {
        let platform = sample_platform();
        let board = platform.board("mini").unwrap();

        let info = board
            .build_info(platform.properties(), &MenuSelection::new())
            .unwrap();
        assert_eq!(info.get("build.mcu"), Some("atmega328p"));
    }

    #[test]
    fn test_missing_selection_without_default_is_ambiguous() {
        let boards = PropertyTree::parse(
            "m.name=M\n\
             m.menu.cpu.a=A\n\
             m.menu.cpu.a.build.mcu=a\n",
        );
        let menu_titles = PropertyTree::new();
        let board = Board::from_tree("m", &boards.sub_tree("m"), &menu_titles);

        let err = board
            .build_info(&PropertyTree::new(), &MenuSelection::new())
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::AmbiguousMenuSelection {
                board: "m".to_string(),
                menu: "cpu".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_menu_option_rejected() {
        let platform = sample_platform();
        let board = platform.board("mini").unwrap();

        let mut selection = MenuSelection::new();
        selection.insert("cpu".to_string(), "z80".to_string());
        let err = board
            .build_info(platform.properties(), &selection)
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownMenuOption { .. }));
    }

    #[test]
    fn test_build_info_cached_per_selection() {
        let platform = sample_platform();
        let board = platform.board("mini").unwrap();

        let mut a = MenuSelection::new();
        a.insert("cpu".to_string(), "atmega328".to_string());
        let mut b = MenuSelection::new();
        b.insert("cpu".to_string(), "atmega168".to_string());

        let first = board.build_info(platform.properties(), &a).unwrap();
        let second = board.build_info(platform.properties(), &a).unwrap();
        let other = board.build_info(platform.properties(), &b).unwrap();

        assert_eq!(first, second);
        assert_ne!(first.get("build.mcu"), other.get("build.mcu"));
    }

    #[test]
    fn test_build_info_keyed_on_platform_defaults() {
        let platform = sample_platform();
        let board = platform.board("uno").unwrap();

        let avr_defaults = PropertyTree::parse("build.arch=AVR\n");
        let sam_defaults = PropertyTree::parse("build.arch=SAM\n");

        let first = board.build_info(&avr_defaults, &MenuSelection::new()).unwrap();
        let second = board.build_info(&sam_defaults, &MenuSelection::new()).unwrap();

        assert_eq!(first.get("build.arch"), Some("AVR"));
        assert_eq!(second.get("build.arch"), Some("SAM"));
    }

    #[test]
    fn test_toolchain_refs_from_properties() {
        let platform = sample_platform();
        assert_eq!(
            platform.toolchain_refs(),
            vec![("avr-gcc".to_string(), "7.3.0".to_string())]
        );
    }
}
