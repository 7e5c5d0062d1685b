//! Slipmap CLI - command-line tools for the slipmap engine
//!
//! Renders viewports from local tile fixtures into SVG files and inspects
//! the scheduler's wanted-tile math.

mod commands;
mod source;
mod svg;

use clap::{Parser, Subcommand};
use std::process;

#[derive(Parser)]
#[command(name = "slipmap")]
#[command(version = slipmap::VERSION)]
#[command(about = "Render tiled maps from local fixtures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one viewport to an SVG file
    Render(commands::render::RenderArgs),
    /// Print the wanted tile set for a camera position
    Tiles(commands::tiles::TilesArgs),
}

#[tokio::main]
async fn main() {
    if let Err(error) = slipmap::logging::init() {
        eprintln!("Warning: logging already initialized: {error}");
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Render(args) => commands::render::run(args).await,
        Command::Tiles(args) => commands::tiles::run(&args),
    };

    if let Err(error) = result {
        eprintln!("Error: {error}");
        process::exit(1);
    }
}
