//! Change notifications for scene files.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::error::{Result, SceneError};

use super::manifest::Manifest;
use super::scanner::is_scene_file;

/// What happened to a scene file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneChange {
    Changed(PathBuf),
    Removed(PathBuf),
}

impl SceneChange {
    /// The file the change refers to.
    pub fn path(&self) -> &Path {
        match self {
            SceneChange::Changed(p) | SceneChange::Removed(p) => p,
        }
    }
}

/// Watches a project tree and reports scene file changes.
pub struct SceneWatcher {
    root: PathBuf,
    manifest: Manifest,
    rx: mpsc::Receiver<notify::Result<Event>>,
    // Dropping the watcher stops notifications.
    _watcher: RecommendedWatcher,
}

impl SceneWatcher {
    /// Start watching `root` recursively.
    pub fn new(root: &Path, manifest: Manifest) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx).map_err(watch_error)?;

        for source in manifest.effective_sources() {
            let path = root.join(&source);
            if path.exists() {
                watcher
                    .watch(&path, RecursiveMode::Recursive)
                    .map_err(watch_error)?;
                debug!(path = %path.display(), "watching");
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            manifest,
            rx,
            _watcher: watcher,
        })
    }

    /// Block until the next batch of scene changes.
    ///
    /// Events arriving within `debounce` of each other are merged. Returns
    /// `None` once the watcher has shut down.
    pub fn next_batch(&self, debounce: Duration) -> Option<Vec<SceneChange>> {
        let mut changes = Vec::new();

        loop {
            let first = self.rx.recv().ok()?;
            self.record(first, &mut changes);

            while let Ok(event) = self.rx.recv_timeout(debounce) {
                self.record(event, &mut changes);
            }

            if !changes.is_empty() {
                return Some(changes);
            }
        }
    }

    fn record(&self, event: notify::Result<Event>, changes: &mut Vec<SceneChange>) {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "watch error");
                return;
            }
        };

        for path in event.paths {
            if !is_scene_file(&path) {
                continue;
            }
            let relative = path.strip_prefix(&self.root).unwrap_or(&path);
            if self.manifest.is_excluded(relative) {
                continue;
            }

            let change = match event.kind {
                EventKind::Remove(_) => SceneChange::Removed(path),
                EventKind::Create(_) | EventKind::Modify(_) => SceneChange::Changed(path),
                _ => continue,
            };
            if !changes.contains(&change) {
                changes.push(change);
            }
        }
    }
}

fn watch_error(e: notify::Error) -> SceneError {
    SceneError::Config {
        message: format!("Failed to watch files: {}", e),
        help: None,
    }
}
