use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::style::StyleError;

/// Main error type for layerex operations
#[derive(Error, Diagnostic, Debug)]
pub enum LayerexError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(layerex::io))]
    Io { path: PathBuf, message: String },

    #[error("Config error: {message}")]
    #[diagnostic(code(layerex::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Document error: {message}")]
    #[diagnostic(code(layerex::document))]
    Document {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Style error: {0}")]
    #[diagnostic(
        code(layerex::style),
        help("every layer should carry a display property once visibility is applied")
    )]
    Style(#[from] StyleError),

    #[error("{tool} failed: {message}")]
    #[diagnostic(code(layerex::tool))]
    ExternalTool {
        tool: String,
        /// Exit code, if the process ran and exited normally.
        status: Option<i32>,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Artifact '{name}' failed while {step}")]
    #[diagnostic(code(layerex::artifact))]
    Artifact {
        name: String,
        step: Step,
        #[source]
        source: Box<LayerexError>,
    },
}

impl LayerexError {
    /// Attach the artifact name and failing step to an error.
    pub fn in_artifact(self, name: &str, step: Step) -> Self {
        LayerexError::Artifact {
            name: name.to_string(),
            step,
            source: Box::new(self),
        }
    }
}

/// The per-artifact pipeline step an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Resolve,
    Prune,
    Save,
    Render,
    Cleanup,
    Convert,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Resolve => "resolving layer visibility",
            Step::Prune => "removing hidden layers",
            Step::Save => "saving the SVG",
            Step::Render => "rendering with inkscape",
            Step::Cleanup => "deleting the generated SVG",
            Step::Convert => "converting the rendered image",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, LayerexError>;
