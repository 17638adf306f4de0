//! Per-artifact export pipeline.
//!
//! For each artifact, in order: resolve layer visibility, optionally drop the
//! hidden layers from a copy of the drawing, save the SVG, render it with
//! inkscape, optionally delete the SVG, and optionally convert the PNG.
//!
//! # Example
//!
//! ```ignore
//! use layerex::{ArtifactPipeline, Config, GenerationSpec, LayerDirectory, SvgDocument};
//! use layerex::output::Printer;
//! use layerex::pipeline::SystemRunner;
//!
//! let config = Config::load("layers.json".as_ref())?;
//! let mut drawing = SvgDocument::load("drawing.svg".as_ref())?;
//! let layers = LayerDirectory::discover(&drawing);
//!
//! let pipeline = ArtifactPipeline::new(&config, GenerationSpec::from_config(&config));
//! pipeline.prepare_output_dir()?;
//! pipeline.run(&mut drawing, &layers, &mut SystemRunner, &Printer::new())?;
//! ```

mod tools;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::config::Config;
use crate::document::{prune, LayerDirectory, SvgDocument};
use crate::error::{LayerexError, Result, Step};
use crate::generation::GenerationSpec;
use crate::output::{display_path, Printer};
use crate::visibility::VisibilitySnapshot;

pub use tools::{
    converter_argv, display_command, renderer_argv, SystemRunner, ToolOutput, ToolRunner, Tools,
};

/// What to do when an artifact fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run at the first failure.
    #[default]
    Abort,
    /// Record the failure and move on to the next artifact.
    Continue,
}

/// Settings for the secondary conversion step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Output extension, without a leading dot.
    pub format: String,
    pub args: Vec<String>,
}

/// Pipeline settings, usually taken from a [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub output_dir: PathBuf,
    pub renderer_args: Vec<String>,
    pub prune_hidden: bool,
    pub delete_svgs: bool,
    pub convert: Option<ConvertOptions>,
    pub tools: Tools,
    pub on_failure: FailurePolicy,
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            output_dir: config.build_path.clone(),
            renderer_args: config.inkscape_args.clone(),
            prune_hidden: config.del_invisible_layers_on_save,
            delete_svgs: config.del_generated_svgs,
            convert: config.im_convert.then(|| ConvertOptions {
                format: config.convert_format().to_string(),
                args: config.im_convert_args.clone(),
            }),
            tools: Tools::default(),
            on_failure: FailurePolicy::default(),
        }
    }
}

/// One artifact and the files it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub name: String,
    /// Labels of the layers to show.
    pub labels: Vec<String>,
    /// Intermediate SVG written by the pipeline.
    pub svg_path: PathBuf,
    /// PNG written by the renderer.
    pub png_path: PathBuf,
    /// Output of the converter, when conversion is enabled.
    pub converted_path: Option<PathBuf>,
}

/// An artifact that failed under [`FailurePolicy::Continue`].
#[derive(Debug)]
pub struct ArtifactFailure {
    pub record: ArtifactRecord,
    pub error: LayerexError,
}

/// Outcome of a pipeline run.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub completed: Vec<ArtifactRecord>,
    pub failed: Vec<ArtifactFailure>,
    /// Artifact name to the configured labels that matched no layer.
    pub missing_labels: IndexMap<String, Vec<String>>,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Generates every artifact of a [`GenerationSpec`].
#[derive(Debug, Clone)]
pub struct ArtifactPipeline {
    options: PipelineOptions,
    spec: GenerationSpec,
}

impl ArtifactPipeline {
    pub fn new(config: &Config, spec: GenerationSpec) -> Self {
        Self::with_options(PipelineOptions::from(config), spec)
    }

    pub fn with_options(options: PipelineOptions, spec: GenerationSpec) -> Self {
        Self { options, spec }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.options.on_failure = policy;
        self
    }

    pub fn with_tools(mut self, tools: Tools) -> Self {
        self.options.tools = tools;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn spec(&self) -> &GenerationSpec {
        &self.spec
    }

    /// Create the output directory if needed.
    pub fn prepare_output_dir(&self) -> Result<()> {
        let dir = &self.options.output_dir;
        std::fs::create_dir_all(dir).map_err(|e| LayerexError::Io {
            path: dir.clone(),
            message: format!("Failed to create output directory: {}", e),
        })
    }

    /// The record for one artifact.
    pub fn record<'a>(
        &self,
        name: &str,
        labels: impl IntoIterator<Item = &'a String>,
    ) -> ArtifactRecord {
        let dir = &self.options.output_dir;
        ArtifactRecord {
            name: name.to_string(),
            labels: labels.into_iter().cloned().collect(),
            svg_path: dir.join(format!("{}.svg", name)),
            png_path: dir.join(format!("{}.png", name)),
            converted_path: self
                .options
                .convert
                .as_ref()
                .map(|c| dir.join(format!("{}.{}", name, c.format))),
        }
    }

    /// Records for all artifacts, in generation order.
    pub fn records(&self) -> Vec<ArtifactRecord> {
        self.spec
            .iter()
            .map(|(name, labels)| self.record(name, labels))
            .collect()
    }

    /// Generate every artifact.
    ///
    /// `directory` must have been discovered from `document`. The document's
    /// layer styles are rewritten for each artifact; its structure is never
    /// changed.
    pub fn run<R: ToolRunner>(
        &self,
        document: &mut SvgDocument,
        directory: &LayerDirectory,
        runner: &mut R,
        printer: &Printer,
    ) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        for record in self.records() {
            let (snapshot, missing) =
                VisibilitySnapshot::resolve(directory, record.labels.iter().map(String::as_str));
            if !missing.is_empty() {
                log::warn!("{}: no layer labelled {}", record.name, missing.join(", "));
                report.missing_labels.insert(
                    record.name.clone(),
                    missing.into_iter().map(str::to_string).collect(),
                );
            }

            match self.process(&record, &snapshot, document, directory, runner, printer) {
                Ok(()) => report.completed.push(record),
                Err(error) => match self.options.on_failure {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::Continue => {
                        printer.error("Failed", &error.to_string());
                        report.failed.push(ArtifactFailure { record, error });
                    }
                },
            }
        }

        Ok(report)
    }

    fn process<R: ToolRunner>(
        &self,
        record: &ArtifactRecord,
        snapshot: &VisibilitySnapshot,
        document: &mut SvgDocument,
        directory: &LayerDirectory,
        runner: &mut R,
        printer: &Printer,
    ) -> Result<()> {
        let name = record.name.as_str();
        let fail = |step: Step| move |e: LayerexError| e.in_artifact(name, step);

        snapshot.apply(document, directory).map_err(fail(Step::Resolve))?;
        log::debug!(
            "{}: {} of {} layer(s) visible",
            name,
            snapshot.visible_count(),
            directory.len()
        );

        if self.options.prune_hidden {
            let pruned = prune(document.clone()).map_err(fail(Step::Prune))?;
            pruned.save(&record.svg_path).map_err(fail(Step::Save))?;
        } else {
            document.save(&record.svg_path).map_err(fail(Step::Save))?;
        }

        let tools = &self.options.tools;
        let args = renderer_argv(&self.options.renderer_args, &record.svg_path);
        printer.status("Rendering", &format!("{} -> {}", name, display_path(&record.png_path)));
        log::debug!("{}", display_command(&tools.renderer, &args));
        runner
            .run(&tools.renderer, &args)
            .and_then(ToolOutput::into_result)
            .map_err(fail(Step::Render))?;

        if self.options.delete_svgs {
            printer.info("Removing", &display_path(&record.svg_path));
            remove_if_exists(&record.svg_path).map_err(fail(Step::Cleanup))?;
        }

        if let Some(output) = &record.converted_path {
            self.convert(record, output, runner, printer)
                .map_err(fail(Step::Convert))?;
        }

        Ok(())
    }

    fn convert<R: ToolRunner>(
        &self,
        record: &ArtifactRecord,
        output: &Path,
        runner: &mut R,
        printer: &Printer,
    ) -> Result<()> {
        let extra = self
            .options
            .convert
            .as_ref()
            .map(|c| c.args.as_slice())
            .unwrap_or_default();

        if !record.png_path.exists() {
            return Err(LayerexError::Io {
                path: record.png_path.clone(),
                message: "expected renderer output is missing".to_string(),
            });
        }

        let tools = &self.options.tools;
        let args = converter_argv(&record.png_path, extra, output);
        printer.status("Converting", &format!("{} -> {}", record.name, display_path(output)));
        log::debug!("{}", display_command(&tools.converter, &args));
        runner.run(&tools.converter, &args)?.into_result()?;
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("{} was already removed", path.display());
            Ok(())
        }
        Err(e) => Err(LayerexError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to delete generated SVG: {}", e),
        }),
    }
}
