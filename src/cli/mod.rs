pub mod build;

use clap::Parser;

/// layerex - Export layer combinations of an Inkscape drawing
#[derive(Parser, Debug)]
#[command(name = "layerex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub build: build::BuildArgs,
}
