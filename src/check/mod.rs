//! Consistency checks over a parsed scene.
//!
//! Parsing is lenient about dangling references and late parents; these
//! checks report them after the fact. Used by `tscn check`.

mod checks;
mod diagnostic;

pub use diagnostic::{CheckResult, Diagnostic, Severity};

use crate::scene::Scene;

/// Run every check against the scene.
pub fn check_scene(scene: &Scene) -> CheckResult {
    let mut result = CheckResult::new();

    result.merge(checks::check_root(scene));
    result.merge(checks::check_instances(scene));
    result.merge(checks::check_scripts(scene));
    result.merge(checks::check_sub_resource_refs(scene));
    result.merge(checks::check_orphans(scene));
    result.merge(checks::check_unused_external(scene));

    result
}
