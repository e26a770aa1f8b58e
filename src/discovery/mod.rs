//! Scene discovery and loading for Godot projects.
//!
//! Finds every text scene under a project directory, either by walking the
//! whole tree or by following the `sources` of a `tscn.yaml` manifest.
//!
//! # Example
//!
//! ```ignore
//! use tscn::discovery::discover;
//!
//! let project = discover("./my-game")?;
//! for result in project.load_all() {
//!     let scene = result?;
//!     println!("{}: {} nodes", scene.title, scene.node_count());
//! }
//! ```

mod cache;
mod manifest;
mod scanner;
mod watch;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::scene::Scene;

pub use cache::{load_scene, SceneCache};
pub use manifest::Manifest;
pub use scanner::{is_scene_file, scan_directory, scan_sources, ScanResult, SCENE_EXTENSIONS};
pub use watch::{SceneChange, SceneWatcher};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "tscn.yaml";

/// Scenes found in a project.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// The project root directory.
    pub root: PathBuf,

    /// The loaded manifest (default if no tscn.yaml was found).
    pub manifest: Manifest,

    pub has_manifest: bool,

    pub scan: ScanResult,
}

impl DiscoveryResult {
    /// Parse every discovered scene with the manifest's options.
    ///
    /// One result per file, in path order; a failing file does not stop
    /// the others.
    pub fn load_all(&self) -> Vec<Result<Scene>> {
        let options = self.manifest.parse_options();
        self.scan
            .scenes
            .iter()
            .map(|path| load_scene(path, &options, None))
            .collect()
    }

    /// An empty cache configured from the manifest.
    pub fn cache(&self) -> SceneCache {
        SceneCache::new(self.manifest.parse_options())
    }
}

/// Discover scenes in a project directory.
///
/// Uses `tscn.yaml` in `root` when present, otherwise scans the whole
/// directory with default settings.
pub fn discover(root: impl AsRef<Path>) -> Result<DiscoveryResult> {
    let root = root.as_ref().to_path_buf();

    let manifest_path = root.join(MANIFEST_FILENAME);
    let (manifest, has_manifest) = if manifest_path.exists() {
        (Manifest::load(&manifest_path)?, true)
    } else {
        (Manifest::default(), false)
    };

    let scan = scan_sources(&manifest.effective_sources(), &root, &manifest);
    tracing::debug!(root = %root.display(), scenes = scan.total(), "discovered scenes");

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest,
        scan,
    })
}

/// Discover scenes from explicit files and directories (no manifest lookup).
pub fn discover_paths(paths: &[PathBuf]) -> Result<DiscoveryResult> {
    let manifest = Manifest::default();
    let mut scan = ScanResult::new();

    for path in paths {
        if path.is_dir() {
            scan.merge(scan_directory(path, &manifest));
        } else if path.is_file() && is_scene_file(path) {
            scan.merge(ScanResult {
                scenes: vec![path.clone()],
            });
        }
    }

    let root = paths
        .first()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest: false,
        scan,
    })
}
