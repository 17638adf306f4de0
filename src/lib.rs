//! layerex - Inkscape layer exporter
//!
//! Generates one image per configured combination of layers from a single
//! layered SVG drawing, by toggling layer visibility, saving an SVG per
//! combination, and rendering it with inkscape (optionally followed by an
//! ImageMagick conversion).

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod generation;
pub mod output;
pub mod pipeline;
pub mod style;
pub mod validation;
pub mod visibility;

pub use config::{Config, LabelMap};
pub use document::{prune, Element, Layer, LayerDirectory, Node, NodePath, SvgDocument};
pub use error::{LayerexError, Result, Step};
pub use generation::GenerationSpec;
pub use pipeline::{
    ArtifactFailure, ArtifactPipeline, ArtifactRecord, FailurePolicy, PipelineOptions,
    PipelineReport, SystemRunner, ToolOutput, ToolRunner, Tools,
};
pub use style::{get_property, set_property, Style, StyleError};
pub use validation::{validate, Diagnostic, Severity, ValidationResult};
pub use visibility::{Visibility, VisibilitySnapshot};
