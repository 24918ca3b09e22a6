use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "weave", version, about = "Inspect and render weave templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the parsed tree of a template file with slot indices.
    Inspect {
        /// Template file; `${...}` marks a slot
        input: PathBuf,
    },
    /// Render a template file with literal arguments and print the HTML.
    Render {
        input: PathBuf,
        /// Text for the next slot, in order
        #[arg(long = "arg", value_name = "TEXT")]
        args: Vec<String>,
        /// Print anchors as `<!---->`
        #[arg(long)]
        show_anchors: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect { input } => print!("{}", weave_cli::inspect_cmd(&input)?),
        Commands::Render {
            input,
            args,
            show_anchors,
        } => println!("{}", weave_cli::render_cmd(&input, &args, show_anchors)?),
    }
    Ok(())
}
