//! Project manifest (tscn.yaml) parsing.
//!
//! The manifest names the directories to scan and the parse policy to use
//! for every scene found there.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::parser::DEFAULT_MAX_DEPTH;
use crate::scene::ParseOptions;

/// Project manifest loaded from tscn.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Directories to scan for scenes. Defaults to the project root.
    pub sources: Vec<String>,

    /// Patterns to exclude from discovery.
    pub excludes: Vec<String>,

    /// Fail on `instance` ids with no matching external resource.
    pub strict_references: bool,

    /// Fail on nodes declared before their parent.
    pub strict_order: bool,

    /// Maximum array/dictionary nesting.
    pub max_depth: usize,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            sources: vec![],
            excludes: vec![".godot/*".to_string()],
            strict_references: false,
            strict_order: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Manifest {
    /// Load manifest from a tscn.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SceneError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let manifest: Manifest = serde_yaml::from_str(content).map_err(|e| SceneError::Config {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check tscn.yaml syntax".to_string()),
        })?;

        if manifest.max_depth == 0 {
            return Err(SceneError::Config {
                message: "max_depth must be at least 1".to_string(),
                help: None,
            });
        }

        Ok(manifest)
    }

    /// Parse options configured by this manifest.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
            strict_references: self.strict_references,
            strict_order: self.strict_order,
        }
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.excludes
            .iter()
            .any(|pattern| matches_pattern(&path_str, pattern))
    }

    /// Source paths, defaulting to the project root.
    pub fn effective_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![".".to_string()]
        } else {
            self.sources.clone()
        }
    }
}

/// Minimal glob matching: `*.ext`, `dir/*`, `**/dir/*` or a plain substring.
fn matches_pattern(path: &str, pattern: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix("**/") {
        if let Some(dir) = suffix.strip_suffix("/*") {
            return path.starts_with(&format!("{}/", dir)) || path.contains(&format!("/{}/", dir));
        }
        return path.contains(suffix);
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        if !pattern.contains('/') {
            return path.ends_with(suffix);
        }
    }

    if let Some(prefix) = pattern.strip_suffix("/*") {
        return path.starts_with(&format!("{}/", prefix)) || path.contains(&format!("/{}/", prefix));
    }

    path.contains(pattern)
}
