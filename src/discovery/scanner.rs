//! File system scanner for discovering scene files.

use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use super::manifest::Manifest;

/// Extensions treated as text scenes.
pub const SCENE_EXTENSIONS: &[&str] = &["tscn", "scn"];

/// Scene files found under a set of sources, sorted and deduplicated.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanResult {
    pub scenes: Vec<PathBuf>,
}

impl ScanResult {
    /// Create an empty scan result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of scene files found.
    pub fn total(&self) -> usize {
        self.scenes.len()
    }

    /// Check if no scene files were found.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Merge another result in, keeping paths sorted and unique.
    pub fn merge(&mut self, other: ScanResult) {
        self.scenes.extend(other.scenes);
        self.scenes.sort();
        self.scenes.dedup();
    }
}

/// Recursively collect scene files under `root`, skipping excluded paths.
pub fn scan_directory(root: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if manifest.is_excluded(relative) {
            trace!(path = %path.display(), "excluded");
            continue;
        }

        if is_scene_file(path) {
            result.scenes.push(path.to_path_buf());
        }
    }

    result
}

/// Scan every manifest source relative to `base_path`.
pub fn scan_sources(sources: &[String], base_path: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    for source in sources {
        let source_path = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            base_path.join(source)
        };

        result.merge(scan_directory(&source_path, manifest));
    }

    result
}

/// Check if a path has a scene or resource extension.
pub fn is_scene_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SCENE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_scene_file() {
        assert!(is_scene_file(Path::new("player.tscn")));
        assert!(is_scene_file(Path::new("levels/boss.scn")));
        assert!(!is_scene_file(Path::new("theme.tres")));
        assert!(!is_scene_file(Path::new("player.gd")));
        assert!(!is_scene_file(Path::new("tscn")));
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("levels")).unwrap();
        fs::write(dir.path().join("main.tscn"), "").unwrap();
        fs::write(dir.path().join("levels/one.tscn"), "").unwrap();
        fs::write(dir.path().join("levels/one.gd"), "").unwrap();

        let result = scan_directory(dir.path(), &Manifest::default());

        assert_eq!(result.total(), 2);
        assert!(result.scenes.iter().all(|p| is_scene_file(p)));
    }

    #[test]
    fn test_scan_skips_godot_cache() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".godot/editor")).unwrap();
        fs::write(dir.path().join(".godot/editor/cached.tscn"), "").unwrap();
        fs::write(dir.path().join("main.tscn"), "").unwrap();

        let result = scan_directory(dir.path(), &Manifest::default());

        assert_eq!(result.total(), 1);
        assert!(result.scenes[0].ends_with("main.tscn"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let result = scan_directory(Path::new("/nonexistent/scenes"), &Manifest::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_scan_sources_deduplicates() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ui")).unwrap();
        fs::write(dir.path().join("ui/hud.tscn"), "").unwrap();

        let sources = vec![".".to_string(), "ui".to_string()];
        let result = scan_sources(&sources, dir.path(), &Manifest::default());

        assert_eq!(result.total(), 1);
    }
}
