//! Finding diagram files under an input directory

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Native draw.io file pattern
const DRAWIO_PATTERN: &str = "**/*.drawio";

/// Plain XML diagrams, only picked up on request
const XML_PATTERN: &str = "**/*.xml";

fn build_matcher(include_xml: bool) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    builder.add(Glob::new(DRAWIO_PATTERN).context("Invalid glob pattern")?);
    if include_xml {
        builder.add(Glob::new(XML_PATTERN).context("Invalid glob pattern")?);
    }
    builder.build().context("Failed to compile glob patterns")
}

/// Recursively collect diagram files below `input_dir`
///
/// Only regular files are returned, sorted so runs are deterministic.
/// Symlinks to files count as files; symlinked directories are not descended
/// into. Unreadable directory entries are skipped.
pub fn discover(input_dir: &Path, include_xml: bool) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", input_dir.display());
    }

    let matcher = build_matcher(include_xml)?;
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.path().is_file())
        .filter(|entry| {
            let relative = entry.path().strip_prefix(input_dir).unwrap_or(entry.path());
            matcher.is_match(relative)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    tracing::info!("Discovered {} diagram files in {}", files.len(), input_dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("b/nested/z.drawio"), "z").unwrap();
        fs::write(root.join("a/diagram.drawio"), "d").unwrap();
        fs::write(root.join("top.drawio"), "t").unwrap();
        fs::write(root.join("a/legacy.xml"), "x").unwrap();
        fs::write(root.join("a/readme.md"), "r").unwrap();
        temp_dir
    }

    #[test]
    fn test_discover_native_only_sorted() {
        let temp_dir = create_tree();
        let root = temp_dir.path();

        let files = discover(root, false).unwrap();
        assert_eq!(
            files,
            vec![
                root.join("a/diagram.drawio"),
                root.join("b/nested/z.drawio"),
                root.join("top.drawio"),
            ]
        );
    }

    #[test]
    fn test_discover_with_xml() {
        let temp_dir = create_tree();
        let root = temp_dir.path();

        let files = discover(root, true).unwrap();
        assert_eq!(files.len(), 4);
        assert!(files.contains(&root.join("a/legacy.xml")));
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_discover_ignores_directories_named_like_diagrams() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("folder.drawio")).unwrap();

        let files = discover(temp_dir.path(), false).unwrap();
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_follows_file_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("real.txt"), "<mxfile/>").unwrap();
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.drawio")).unwrap();
        std::os::unix::fs::symlink(root.join("nowhere"), root.join("dangling.drawio")).unwrap();

        let files = discover(root, false).unwrap();
        assert_eq!(files, vec![root.join("link.drawio")]);
    }

    #[test]
    fn test_discover_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = discover(&temp_dir.path().join("missing"), false);
        assert!(result.is_err());
    }
}
