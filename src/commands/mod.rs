//! # CLI Command Implementations
//!
//! One module per subcommand. Each module defines an `Args` struct derived
//! with `clap` and an `execute` function that calls into the `distpack`
//! library.
//!
//! The options shared by `build` and `ls` (config file, compilation
//! switches) live in [`ProjectArgs`] here, together with the loader both
//! commands use.

pub mod build;
pub mod completions;
pub mod ls;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use distpack::arch::Arch;
use distpack::config::{self, ProjectConfig};
use distpack::defaults::DEFAULT_CONFIG_FILENAME;
use distpack::package::BuildOptions;
use distpack::suggestions;

/// Options selecting and adjusting the project configuration
#[derive(Args, Debug, Default)]
pub struct ProjectArgs {
    /// Path to the distpack.yaml configuration file.
    ///
    /// When omitted, `distpack.yaml` in the current directory is used if it
    /// exists, and the built-in defaults otherwise.
    #[arg(short, long, value_name = "FILE", env = "DISTPACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Copy sources verbatim instead of compiling them.
    #[arg(long)]
    pub no_compile: bool,

    /// Python interpreter used to compile sources.
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,
}

/// A loaded configuration and the directory its relative paths anchor at
pub struct Project {
    pub config: ProjectConfig,
    pub base_dir: PathBuf,
}

impl ProjectArgs {
    /// Load the configuration these options point at.
    pub fn load(&self) -> Result<Project> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let (path, explicit) = match &self.config {
            Some(path) => (cwd.join(path), true),
            None => (cwd.join(DEFAULT_CONFIG_FILENAME), false),
        };

        if !path.exists() {
            if explicit {
                return Err(suggestions::config_not_found(&path));
            }
            log::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILENAME);
            return Ok(Project {
                config: ProjectConfig::default(),
                base_dir: cwd,
            });
        }

        let config = config::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
        Ok(Project { config, base_dir })
    }

    /// Build options carrying the compilation switches.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            compile: !self.no_compile,
            interpreter: self.python.clone(),
            ..BuildOptions::default()
        }
    }
}

/// Parse an architecture argument, suggesting a fix on failure.
pub fn parse_arch(value: &str) -> Result<Arch> {
    value.parse().map_err(|_| suggestions::unknown_arch(value))
}
