//! Markant command-line interface
//!
//! Batch annotation of text files against a marker definition bundle.

use clap::{Parser, Subcommand};
use markant_cli::commands::{AnnotateArgs, ValidateArgs};

#[derive(Debug, Parser)]
#[command(
    name = "markant",
    version,
    about = "Hierarchical marker annotation for text files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Annotate text files with a marker definition bundle
    Annotate(AnnotateArgs),
    /// Validate a marker definition bundle without processing text
    Validate(ValidateArgs),
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Annotate(args) => args.execute(),
        Commands::Validate(args) => args.execute(),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
