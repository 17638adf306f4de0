//! Build command implementation.
//!
//! Loads the configuration and the drawing, then generates every configured
//! artifact.

use std::path::PathBuf;

use clap::Args;

use crate::config::Config;
use crate::document::{LayerDirectory, SvgDocument};
use crate::error::Result;
use crate::generation::GenerationSpec;
use crate::output::{display_path, plural, Printer};
use crate::pipeline::{ArtifactPipeline, PipelineReport, SystemRunner, ToolRunner};
use crate::validation::{print_diagnostics, validate};

/// Export each configured layer combination as an image
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// JSON configuration file
    #[arg(long, short = 'c')]
    pub config_file: PathBuf,

    /// Inkscape SVG drawing
    #[arg(long, short = 's')]
    pub svg_file: PathBuf,
}

pub fn run(args: BuildArgs, printer: &Printer) -> Result<()> {
    run_with(args, &mut SystemRunner, printer).map(|_| ())
}

/// Run the build with a specific tool runner.
pub fn run_with<R: ToolRunner>(
    args: BuildArgs,
    runner: &mut R,
    printer: &Printer,
) -> Result<PipelineReport> {
    let config = Config::load(&args.config_file)?;

    printer.status("Loading", &display_path(&args.svg_file));
    let mut drawing = SvgDocument::load(&args.svg_file)?;
    let layers = LayerDirectory::discover(&drawing);
    printer.info("Found", &plural(layers.len(), "layer", "layers"));

    let spec = GenerationSpec::from_config(&config);
    print_diagnostics(&validate(&spec, &layers), printer);

    let pipeline = ArtifactPipeline::new(&config, spec);
    pipeline.prepare_output_dir()?;

    let report = pipeline.run(&mut drawing, &layers, runner, printer)?;

    printer.status(
        "Finished",
        &format!(
            "{} in {}",
            plural(report.completed.len(), "artifact", "artifacts"),
            printer.cyan(&display_path(&config.build_path))
        ),
    );

    Ok(report)
}
