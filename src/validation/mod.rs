//! Pre-flight checks run before any artifact is generated.
//!
//! Findings are reported as warnings; the export still runs so that a
//! drawing and its configuration can drift apart without breaking builds.

mod checks;
mod warning;

pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::document::LayerDirectory;
use crate::generation::GenerationSpec;
use crate::output::Printer;

/// Run all checks against the generation spec and the drawing's layers.
pub fn validate(spec: &GenerationSpec, directory: &LayerDirectory) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_has_layers(directory));
    result.merge(checks::check_duplicate_labels(directory));
    result.merge(checks::check_name_collisions(spec));
    result.merge(checks::check_unknown_labels(spec, directory));
    result.merge(checks::check_empty_artifacts(spec, directory));

    result
}

/// Print diagnostics to stderr.
pub fn print_diagnostics(result: &ValidationResult, printer: &Printer) {
    for d in result.iter() {
        let message = format!("{} {}", d.message, printer.dim(&format!("[{}]", d.code)));
        printer.warning(&d.severity.to_string(), &message);
        if let Some(help) = &d.help {
            printer.line(&format!("{:>12} {}", "", printer.dim(&format!("help: {}", help))));
        }
    }
}
