//! # distpack CLI
//!
//! Binary entry point for the `distpack` command-line tool. It parses the
//! arguments with `clap`, dispatches to the selected command and reports
//! fatal errors.
//!
//! The packaging logic itself lives in the library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
