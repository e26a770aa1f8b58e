//! Check command implementation.

use std::path::PathBuf;

use clap::Args;

use crate::check::check_scene;
use crate::discovery::load_scene;
use crate::error::{Result, SceneError};
use crate::output::{display_path, plural, Printer};

use super::{find_scenes, ParseFlags};

/// Report dangling references, orphans and unused resources
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Scene files or directories (default: current project)
    pub files: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub deny_warnings: bool,

    #[command(flatten)]
    pub parse: ParseFlags,
}

/// Run the check command.
pub fn run(args: CheckArgs, printer: &Printer) -> Result<()> {
    let discovery = find_scenes(&args.files)?;
    let options = args.parse.apply(discovery.manifest.parse_options());

    let mut errors = 0;
    let mut warnings = 0;

    for path in &discovery.scan.scenes {
        let shown = display_path(path);
        printer.status("Checking", &shown);

        let scene = match load_scene(path, &options, None) {
            Ok(scene) => scene,
            Err(e) => {
                errors += 1;
                printer.error("error", &format!("{}: {}", shown, e));
                continue;
            }
        };

        let result = check_scene(&scene);
        for diagnostic in result.iter() {
            printer.diagnostic(&shown, diagnostic);
        }
        errors += result.error_count();
        warnings += result.warning_count();
    }

    let scenes = plural(discovery.scan.total(), "scene", "scenes");
    let failed = errors > 0 || (args.deny_warnings && warnings > 0);

    if failed {
        return Err(SceneError::Check {
            message: format!(
                "{}: {}, {}",
                scenes,
                plural(errors, "error", "errors"),
                plural(warnings, "warning", "warnings")
            ),
            help: args
                .deny_warnings
                .then(|| "Warnings are denied by --deny-warnings".to_string()),
        });
    }

    if warnings > 0 {
        printer.warning("Finished", &format!("{} ({})", scenes, plural(warnings, "warning", "warnings")));
    } else {
        printer.status("Finished", &format!("{}, no issues", scenes));
    }
    Ok(())
}
