//! Parsed-scene cache keyed by file path and modification time.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use tracing::debug;

use crate::error::{Result, SceneError};
use crate::scene::{parse_scene_with, ParseOptions, Scene};

/// Reparses a file only when its modification time changes.
#[derive(Debug, Default)]
pub struct SceneCache {
    options: ParseOptions,
    entries: HashMap<PathBuf, (u64, Arc<Scene>)>,
}

impl SceneCache {
    /// Create an empty cache that parses with `options`.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
        }
    }

    /// Load a scene, returning the cached copy when the file is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Scene>> {
        let mtime = modified_ms(path)?;

        if let Some((cached, scene)) = self.entries.get(path) {
            if *cached == mtime {
                debug!(path = %path.display(), "cache hit");
                return Ok(Arc::clone(scene));
            }
        }

        let scene = Arc::new(load_scene(path, &self.options, Some(mtime))?);
        self.entries
            .insert(path.to_path_buf(), (mtime, Arc::clone(&scene)));
        Ok(scene)
    }

    /// Drop a cached entry, e.g. after the file was removed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Get the number of cached scenes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read and parse one scene file.
pub fn load_scene(path: &Path, options: &ParseOptions, mtime: Option<u64>) -> Result<Scene> {
    let content = fs::read_to_string(path).map_err(|e| SceneError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut scene = parse_scene_with(&path.to_string_lossy(), &content, options)?;
    scene.mtime = mtime;
    Ok(scene)
}

fn modified_ms(path: &Path) -> Result<u64> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| SceneError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0))
}
