use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser as ClapParser;
use tracing::*;

mod logging;

#[derive(Debug, ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The path to a JSON file to check.
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    logging::setup_logging();

    let cli = Args::parse();

    debug!(input = ?cli.input);

    let source = match std::fs::read_to_string(&cli.input) {
        Ok(file) => file,
        Err(e) => {
            error!(path = ?cli.input, "failed to read input");
            return Err(e)
                .with_context(|| format!("failed to read file `{}`", cli.input.display()));
        }
    };

    match jsondiag::parse(&source) {
        Ok(value) => {
            debug!(kind = value.kind_desc(), "parsed");
            println!("{}: OK ({})", cli.input.display(), value.kind_desc());
        }
        Err(dead_ends) => {
            debug!(dead_ends = dead_ends.len());
            if let Some(message) = jsondiag::render_diagnostic(&source, &dead_ends) {
                eprintln!("{message}");
            }
            bail!("failed to parse `{}`", cli.input.display());
        }
    }

    Ok(())
}
