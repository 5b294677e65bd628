//! # Build Command Implementation
//!
//! Assembles the package for one architecture: runs the `before` hooks,
//! processes the layout table into the package directory and runs the
//! `after` hooks.
//!
//! ## Example
//!
//! ```bash
//! # Full build with the project's distpack.yaml
//! distpack build x86
//!
//! # Re-run only the layout step, without bytecode compilation
//! distpack build x64 --skip-before --skip-after --no-compile
//! ```

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use distpack::arch::Arch;
use distpack::error::{CompileError, Error};
use distpack::output::{emoji, format_size, OutputConfig};
use distpack::package::{BuildOptions, PackageBuilder};
use distpack::suggestions;

use super::{parse_arch, ProjectArgs};

/// Build the distribution package
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Package architecture (x86 or x64)
    #[arg(value_name = "ARCH")]
    pub arch: String,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// Package directory, overriding `output` from the configuration.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Do not run the hooks that produce the source trees.
    #[arg(long)]
    pub skip_before: bool,

    /// Do not run the hooks that consume the finished package.
    #[arg(long)]
    pub skip_after: bool,

    /// Only print warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `build` command.
pub fn execute(args: BuildArgs, color_flag: &str) -> Result<()> {
    if args.quiet && log::max_level() > log::LevelFilter::Warn {
        log::set_max_level(log::LevelFilter::Warn);
    }
    let out = OutputConfig::from_env_and_flag(color_flag);
    let arch = parse_arch(&args.arch)?;
    let project = args.project.load()?;

    let output = match &args.output {
        Some(dir) => Some(
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(dir),
        ),
        None => None,
    };
    let options = BuildOptions {
        run_before: !args.skip_before,
        run_after: !args.skip_after,
        output,
        ..args.project.build_options()
    };
    let builder = PackageBuilder::new(&project.config, &project.base_dir).with_options(options);

    // Checked by the builder, after the `before` hooks
    let interpreter = builder.compiler().map(|c| c.interpreter().to_path_buf());
    match &interpreter {
        Some(path) => log::debug!("Compiling with {}", path.display()),
        None => log::info!("Bytecode compilation disabled"),
    }

    if !args.quiet {
        println!(
            "{} Building {} package in {}",
            emoji(&out, "📦", "[BUILD]"),
            arch,
            builder.output_dir(arch).display()
        );
    }

    let report = builder
        .build(arch)
        .map_err(|e| build_error(e, arch, interpreter.as_deref()))?;

    if !args.quiet {
        println!(
            "{} Packaged {} files ({}) into {}",
            emoji(&out, "✅", "[OK]"),
            report.files,
            format_size(report.size),
            report.output.display()
        );
    }

    Ok(())
}

/// Attach context to a failed build. A failed interpreter check gets the
/// interpreter hints instead.
fn build_error(error: Error, arch: Arch, interpreter: Option<&Path>) -> anyhow::Error {
    if let (Error::Compile(failure), Some(interpreter)) = (&error, interpreter) {
        if matches!(failure, CompileError::Failed { source_path, .. } if source_path == interpreter)
        {
            return suggestions::interpreter_unavailable(interpreter, failure);
        }
    }
    anyhow::Error::new(error).context(format!("Failed to build {} package", arch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(config: PathBuf, arch: &str) -> BuildArgs {
        BuildArgs {
            arch: arch.to_string(),
            project: ProjectArgs {
                config: Some(config),
                no_compile: true,
                python: None,
            },
            output: None,
            skip_before: false,
            skip_after: false,
            quiet: true,
        }
    }

    #[test]
    fn test_execute_unknown_arch() {
        let temp = TempDir::new().unwrap();
        let err = execute(args(temp.path().join("distpack.yaml"), "arm64"), "never").unwrap_err();
        assert!(err.to_string().contains("Unknown architecture"));
    }

    #[test]
    fn test_execute_builds_layout() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("distpack.yaml");
        fs::write(
            &config,
            r#"
output: dist/$arch
roots:
  project-source: src
layout:
  - target: /
    source: "project-source:"
    pattern: "*.json"
"#,
        )
        .unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/settings.json"), "{}").unwrap();

        execute(args(config, "x64"), "never").unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("dist/x64/settings.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_missing_interpreter_fails_before_writing() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("distpack.yaml");
        fs::write(&config, "layout: []\n").unwrap();
        let mut args = args(config, "x86");
        args.project.no_compile = false;
        args.project.python = Some("distpack-no-such-python".to_string());

        let err = execute(args, "never").unwrap_err();

        assert!(err.to_string().contains("Python interpreter is not usable"));
        assert!(err.to_string().contains("hint: Use --no-compile"));
        assert!(!temp.path().join("dist").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_interpreter_built_by_before_hook() {
        let temp = TempDir::new().unwrap();
        let interpreter = temp.path().join("runtime/bin/python");
        let config = temp.path().join("distpack.yaml");
        fs::write(
            &config,
            format!(
                r#"
layout: []
compile:
  interpreter: {}
hooks:
  before:
    - name: runtime
      program: sh
      args: ["-c", "mkdir -p runtime/bin && printf '#!/bin/sh\nexit 0\n' > runtime/bin/python && chmod +x runtime/bin/python"]
"#,
                interpreter.display()
            ),
        )
        .unwrap();
        let mut args = args(config, "x64");
        args.project.no_compile = false;

        execute(args, "never").unwrap();

        assert!(interpreter.is_file());
        assert!(temp.path().join("dist/x64").is_dir());
    }
}
