//! Pre-flight checks on the configuration and the drawing.
//!
//! Each check returns a `ValidationResult`. None of them stop a run.

use std::collections::HashSet;

use crate::document::LayerDirectory;
use crate::generation::GenerationSpec;

use super::warning::{Diagnostic, ValidationResult};

/// Names defined in both `generate` and `generate-standalone`.
pub fn check_name_collisions(spec: &GenerationSpec) -> ValidationResult {
    let mut result = ValidationResult::new();

    for name in spec.collisions() {
        result.push(
            Diagnostic::warning(
                "layerex::config::name-collision",
                format!(
                    "Artifact '{}' is defined in both generate and generate-standalone; the standalone entry is used",
                    name
                ),
            )
            .for_artifact(name.as_str())
            .with_help("Rename one of the entries if both artifacts are wanted"),
        );
    }

    result
}

/// Labels in the configuration that match no layer.
pub fn check_unknown_labels(spec: &GenerationSpec, directory: &LayerDirectory) -> ValidationResult {
    let mut result = ValidationResult::new();
    let known: HashSet<&str> = directory.labels().collect();

    for (name, labels) in spec.iter() {
        for label in labels {
            if !known.contains(label.as_str()) {
                result.push(
                    Diagnostic::warning(
                        "layerex::config::unknown-label",
                        format!("Artifact '{}': no layer is labelled '{}'", name, label),
                    )
                    .for_artifact(name)
                    .with_help("Check the layer name in Inkscape's Layers panel"),
                );
            }
        }
    }

    result
}

/// Artifacts that would render with every layer hidden.
pub fn check_empty_artifacts(spec: &GenerationSpec, directory: &LayerDirectory) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (name, labels) in spec.iter() {
        if !labels.iter().any(|l| directory.has_label(l)) {
            result.push(
                Diagnostic::warning(
                    "layerex::config::empty-artifact",
                    format!("Artifact '{}' shows no layers", name),
                )
                .for_artifact(name),
            );
        }
    }

    result
}

/// Labels used by more than one layer.
pub fn check_duplicate_labels(directory: &LayerDirectory) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for label in directory.labels() {
        if !seen.insert(label) && reported.insert(label) {
            result.push(
                Diagnostic::warning(
                    "layerex::document::duplicate-label",
                    format!("More than one layer is labelled '{}'", label),
                )
                .with_help("All of them are shown whenever the label is selected"),
            );
        }
    }

    result
}

/// A drawing without layers.
pub fn check_has_layers(directory: &LayerDirectory) -> ValidationResult {
    let mut result = ValidationResult::new();

    if directory.is_empty() {
        result.push(
            Diagnostic::warning("layerex::document::no-layers", "The drawing has no layers")
                .with_help("Layers are groups created with Inkscape's Layers panel"),
        );
    }

    result
}
