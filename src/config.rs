//! Export configuration (JSON).
//!
//! Every recognised key is listed on [`Config`] with its default. Unknown
//! keys and type mismatches are rejected when the file is loaded.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{LayerexError, Result};

/// Artifact name to the labels of the layers it shows.
pub type LabelMap = IndexMap<String, Vec<String>>;

/// Export configuration loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Output directory for generated files.
    pub build_path: PathBuf,

    /// Extra arguments passed to inkscape before the SVG path.
    pub inkscape_args: Vec<String>,

    /// Remove hidden layers from each SVG before saving it.
    pub del_invisible_layers_on_save: bool,

    /// Delete each generated SVG once it has been rendered.
    pub del_generated_svgs: bool,

    /// Run ImageMagick `convert` on each rendered PNG.
    pub im_convert: bool,

    /// Extension of the converted image (a leading dot is ignored).
    pub im_convert_format: String,

    /// Extra arguments passed to `convert` between input and output.
    pub im_convert_args: Vec<String>,

    /// Grouped artifacts; each also shows the `always-include` layers.
    pub generate: LabelMap,

    /// Standalone artifacts, used exactly as listed.
    pub generate_standalone: LabelMap,

    /// Layers shown in every grouped artifact.
    pub always_include: Vec<String>,
}

fn default_build_path() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build_path: default_build_path(),
            inkscape_args: vec![],
            del_invisible_layers_on_save: false,
            del_generated_svgs: false,
            im_convert: false,
            im_convert_format: "jpg".to_string(),
            im_convert_args: vec![],
            generate: IndexMap::new(),
            generate_standalone: IndexMap::new(),
            always_include: vec![],
        }
    }
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LayerexError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse and validate config JSON.
    ///
    /// The top level must be an object; serde would otherwise also accept
    /// the fields positionally from an array.
    pub fn parse(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content).map_err(invalid)?;
        if !value.is_object() {
            return Err(LayerexError::Config {
                message: "Invalid config: expected a JSON object at the top level".to_string(),
                help: Some(CONFIG_HELP.to_string()),
            });
        }

        let config: Config = serde_json::from_value(value).map_err(invalid)?;

        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.im_convert_format.trim_start_matches('.').is_empty() {
            return Err(LayerexError::Config {
                message: "im-convert-format is empty".to_string(),
                help: Some("Use an image extension such as \"jpg\"".to_string()),
            });
        }

        for name in self.generate.keys().chain(self.generate_standalone.keys()) {
            validate_artifact_name(name)?;
        }

        Ok(())
    }

    /// The conversion extension without any leading dots.
    pub fn convert_format(&self) -> &str {
        self.im_convert_format.trim_start_matches('.')
    }
}

const CONFIG_HELP: &str =
    "Expected a JSON object with keys such as \"generate\" and \"build-path\"";

fn invalid(e: serde_json::Error) -> LayerexError {
    LayerexError::Config {
        message: format!("Invalid config: {}", e),
        help: Some(CONFIG_HELP.to_string()),
    }
}

/// Artifact names become file names under the build path.
fn validate_artifact_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);

    if invalid {
        return Err(LayerexError::Config {
            message: format!("Invalid artifact name '{}'", name),
            help: Some("Artifact names are used as file names; avoid path separators".to_string()),
        });
    }

    Ok(())
}
