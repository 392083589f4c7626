//! Source tree enumeration

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::plan::SourceLanguage;

/// Enumerate compilable sources under a directory, sorted for
/// deterministic plan output. Hidden directories and any directory in
/// `exclude_dirs` are skipped.
pub fn enumerate(dir: &Path, exclude_dirs: &[PathBuf]) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut sources: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let hidden = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'));
            !hidden && !exclude_dirs.iter().any(|d| entry.path() == d)
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| SourceLanguage::from_path(path).is_some())
        .collect();
    sources.sort();
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::create_dir_all(root.join("build")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("z.c"), "").unwrap();
        std::fs::write(root.join("a.cpp"), "").unwrap();
        std::fs::write(root.join("notes.md"), "").unwrap();
        std::fs::write(root.join("sub/boot.S"), "").unwrap();
        std::fs::write(root.join("build/old.c"), "").unwrap();
        std::fs::write(root.join(".git/hook.c"), "").unwrap();

        let sources = enumerate(root, &[root.join("build")]);
        let names: Vec<PathBuf> = sources
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("a.cpp"),
                PathBuf::from("sub/boot.S"),
                PathBuf::from("z.c"),
            ]
        );
    }

    #[test]
    fn test_missing_dir_is_empty() {
        assert!(enumerate(Path::new("/no/such/dir"), &[]).is_empty());
    }
}
