//! manubuild CLI: textbook build pipeline.
//!
//! Splits the master manuscript into chapters, renders figures, and
//! assembles PDF books and PPTX lecture decks per volume.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
