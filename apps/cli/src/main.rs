//! embed-json CLI: inline external JSON `<script>` sources into HTML files.
//!
//! Acts as the build host: discovers files, runs each one through the
//! embedder, and writes the results.

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
