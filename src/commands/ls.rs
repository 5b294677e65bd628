//! # Ls Command Implementation
//!
//! Lists the files a build would place in the package, without running any
//! hook or writing anything. Paths are shown relative to the package
//! directory; entries inside an archive are shown below the archive name.
//!
//! Compilation candidates are listed under their bytecode name. Whether a
//! candidate really compiles is only known during a build; a rejected
//! source is packaged under its original name instead.

use anyhow::{Context, Result};
use clap::Args;

use distpack::package::{PackageBuilder, PlannedEntry};
use distpack::suggestions;

use super::{parse_arch, ProjectArgs};

/// List the files a build would write
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Package architecture (x86 or x64)
    #[arg(value_name = "ARCH")]
    pub arch: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Filter files by glob pattern (e.g., "pylib/**/*.pyc").
    #[arg(short, long, value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Print the plan as JSON.
    #[arg(long)]
    pub json: bool,

    /// Show only the total count of files.
    #[arg(long)]
    pub count: bool,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs) -> Result<()> {
    let arch = parse_arch(&args.arch)?;
    let project = args.project.load()?;
    let builder = PackageBuilder::new(&project.config, &project.base_dir)
        .with_options(args.project.build_options());

    let mut entries = builder
        .plan(arch)
        .with_context(|| format!("Failed to plan {} package", arch))?;

    if let Some(pattern) = &args.pattern {
        let glob_pattern =
            glob::Pattern::new(pattern).map_err(|e| suggestions::invalid_glob(pattern, &e))?;
        entries.retain(|e| glob_pattern.matches(&e.package_path()));
    }

    if args.count {
        println!("{}", entries.len());
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No files would be packaged.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.package_path());
    }
    println!();
    println!("{}", summary(&entries));

    Ok(())
}

fn summary(entries: &[PlannedEntry]) -> String {
    let compiled = entries.iter().filter(|e| e.compiled).count();
    format!("{} file(s), {} compiled", entries.len(), compiled)
}
