use clap::Parser;
use miette::Result;
use layerex::cli::Cli;
use layerex::output::Printer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let printer = Printer::new();

    layerex::cli::build::run(cli.build, &printer)?;

    Ok(())
}
