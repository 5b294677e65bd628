//! # Completions Command Implementation
//!
//! Prints a shell completion script for `distpack` on stdout, generated by
//! `clap_complete` from the CLI definition.
//!
//! ```bash
//! distpack completions bash > ~/.local/share/bash-completion/completions/distpack
//! distpack completions zsh > ~/.zfunc/_distpack
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "distpack", &mut io::stdout());
    Ok(())
}
