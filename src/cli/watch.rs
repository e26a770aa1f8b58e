//! Watch command implementation.
//!
//! Checks every scene once, then re-checks scenes as they change on disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;

use crate::check::check_scene;
use crate::discovery::{discover, SceneCache, SceneChange, SceneWatcher};
use crate::error::Result;
use crate::output::{display_path, plural, Printer};

/// Re-check scenes whenever they change
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Milliseconds to wait for more changes before re-checking
    #[arg(long, default_value = "200")]
    pub debounce: u64,
}

/// Run the watch command.
pub fn run(args: WatchArgs, printer: &Printer) -> Result<()> {
    let discovery = discover(&args.path)?;
    let mut cache = discovery.cache();

    for path in &discovery.scan.scenes {
        report(&mut cache, path, printer);
    }

    let watcher = SceneWatcher::new(&discovery.root, discovery.manifest.clone())?;
    printer.info(
        "Watching",
        &format!(
            "{} ({})",
            display_path(&discovery.root),
            plural(discovery.scan.total(), "scene", "scenes")
        ),
    );

    let debounce = Duration::from_millis(args.debounce);
    while let Some(changes) = watcher.next_batch(debounce) {
        for change in changes {
            match change {
                SceneChange::Changed(path) => report(&mut cache, &path, printer),
                SceneChange::Removed(path) => {
                    cache.invalidate(&path);
                    printer.warning("Removed", &display_path(&path));
                }
            }
        }
    }

    Ok(())
}

/// Parse (through the cache) and check one scene, printing the outcome.
fn report(cache: &mut SceneCache, path: &Path, printer: &Printer) {
    let shown = display_path(path);

    let scene = match cache.load(path) {
        Ok(scene) => scene,
        Err(e) => {
            printer.error("Failed", &format!("{}: {}", shown, e));
            return;
        }
    };

    let result = check_scene(&scene);
    for diagnostic in result.iter() {
        printer.diagnostic(&shown, diagnostic);
    }

    let summary = format!("{} ({})", shown, plural(scene.node_count(), "node", "nodes"));
    if result.has_errors() {
        printer.error("Checked", &summary);
    } else {
        printer.status("Checked", &summary);
    }
}
