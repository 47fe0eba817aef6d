//! Command-line tool for inspecting and validating mokuro volumes.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
