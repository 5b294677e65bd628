//! # Package Assembly
//!
//! Drives the layout table through the resolver and the selector into the
//! materializer.
//!
//! ## Build Sequence
//!
//! [`PackageBuilder::build`] runs, in order:
//!
//! 1. the `before` hooks (they produce the source trees),
//! 2. the interpreter probe, when compilation is enabled,
//! 3. creation of the configured empty directories,
//! 4. [`process_layout`] over the layout table,
//! 5. the `after` hooks (they consume the finished package).
//!
//! Any failure stops the sequence; nothing after it runs.
//!
//! ## Targets
//!
//! Rules sharing a target path write into the same [`Target`], so an archive
//! collects the output of every rule pointing at it and is finalized once,
//! after the last rule.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::arch::Arch;
use crate::compile::{Compiler, PythonCompiler};
use crate::config::{BuildConfig, ProjectConfig};
use crate::error::{Error, Result};
use crate::hooks::{self, HookContext};
use crate::layout::LayoutRule;
use crate::materialize::Target;
use crate::path::{archive_name, join_subpath, target_path};
use crate::resolve::resolve_root;
use crate::select::Selector;

/// Process every rule of `rules` into `output_root`.
///
/// Returns the total number of files written. Rules whose source token
/// names an unknown class are skipped.
pub fn process_layout(
    rules: &[LayoutRule],
    config: &BuildConfig,
    output_root: &Path,
    compiler: Option<&dyn Compiler>,
) -> Result<usize> {
    let mut targets: BTreeMap<PathBuf, Target> = BTreeMap::new();
    let mut total = 0;

    for rule in rules {
        let Some(selector) = selector_for(rule, config)? else {
            continue;
        };

        let target = match targets.entry(target_path(output_root, &rule.target)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let target = Target::open(entry.key())?;
                entry.insert(target)
            }
        };

        let mut copied = 0;
        for selected in selector {
            target.write_entry(&selected?, compiler)?;
            copied += 1;
        }
        info!("Copied {} files", copied);
        debug!("{} -> {}", rule.describe(), target.path().display());
        total += copied;
    }

    for target in targets.into_values() {
        target.finish()?;
    }
    Ok(total)
}

/// A file a build would write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedEntry {
    /// Target of the producing rule, as written in the layout table
    pub target: String,
    /// Path inside the target
    pub destination: String,
    /// File the entry is produced from
    pub source: PathBuf,
    /// Whether the entry is a compilation candidate
    pub compiled: bool,
}

impl PlannedEntry {
    /// Path of the entry relative to the package root, with archive targets
    /// shown as a directory component.
    pub fn package_path(&self) -> String {
        let target: Vec<&str> = self
            .target
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if target.is_empty() {
            self.destination.clone()
        } else {
            format!("{}/{}", target.join("/"), self.destination)
        }
    }
}

/// Compute what [`process_layout`] would write, without writing anything.
///
/// A source is reported as compiled when it is eligible; a build may still
/// copy it verbatim if the compiler rejects it.
pub fn plan(
    rules: &[LayoutRule],
    config: &BuildConfig,
    output_root: &Path,
    compiler: Option<&dyn Compiler>,
) -> Result<Vec<PlannedEntry>> {
    let mut claimed: HashSet<(PathBuf, String)> = HashSet::new();
    let mut planned = Vec::new();

    for rule in rules {
        let Some(selector) = selector_for(rule, config)? else {
            continue;
        };
        let target = target_path(output_root, &rule.target);

        for selected in selector {
            let selected = selected?;
            let eligible = compiler.filter(|c| c.is_eligible(&selected.relative));
            let relative = match eligible {
                Some(c) => c.artifact_path(&selected.relative),
                None => selected.relative.clone(),
            };
            let destination = archive_name(&relative)?;

            if !claimed.insert((target.clone(), destination.clone())) {
                return Err(Error::DuplicateEntry {
                    target,
                    path: relative,
                });
            }
            planned.push(PlannedEntry {
                target: rule.target.clone(),
                destination,
                source: selected.source,
                compiled: eligible.is_some(),
            });
        }
    }

    Ok(planned)
}

fn selector_for<'a>(rule: &LayoutRule, config: &'a BuildConfig) -> Result<Option<Selector<'a>>> {
    let Some(root) = resolve_root(&rule.source, config.arch(), config.roots()) else {
        debug!("Skipping {}: unknown source class", rule.describe());
        return Ok(None);
    };
    if !root.is_dir() {
        warn!("Source root '{}' does not exist", root.display());
    }
    let predicate = rule.predicate.map(|name| config.filters().get(name));
    Selector::new(root, &rule.pattern, predicate).map(Some)
}

/// Switches for a single build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Run the `before` hooks
    pub run_before: bool,
    /// Run the `after` hooks
    pub run_after: bool,
    /// Compile eligible sources (also subject to `compile.enabled`)
    pub compile: bool,
    /// Interpreter overriding `compile.interpreter`
    pub interpreter: Option<String>,
    /// Package directory overriding `output`
    pub output: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            run_before: true,
            run_after: true,
            compile: true,
            interpreter: None,
            output: None,
        }
    }
}

/// Outcome of a finished build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub arch: Arch,
    pub output: PathBuf,
    /// Files written by the layout rules
    pub files: usize,
    /// Total size of the package directory in bytes
    pub size: u64,
}

/// Full build of one project
pub struct PackageBuilder<'a> {
    project: &'a ProjectConfig,
    base_dir: PathBuf,
    options: BuildOptions,
}

impl<'a> PackageBuilder<'a> {
    /// Builder for `project`, whose relative paths are anchored at `base_dir`.
    pub fn new(project: &'a ProjectConfig, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            project,
            base_dir: base_dir.into(),
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Package directory for `arch`.
    pub fn output_dir(&self, arch: Arch) -> PathBuf {
        match &self.options.output {
            Some(output) => self.base_dir.join(output),
            None => self.project.output_dir(arch, &self.base_dir),
        }
    }

    /// The compiler the build would use, if any.
    pub fn compiler(&self) -> Option<PythonCompiler> {
        if !self.options.compile || !self.project.compile.enabled {
            return None;
        }
        let interpreter = self
            .options
            .interpreter
            .as_deref()
            .unwrap_or(&self.project.compile.interpreter);
        Some(PythonCompiler::new(interpreter).with_optimize(self.project.compile.optimize))
    }

    /// List what a build of `arch` would write.
    pub fn plan(&self, arch: Arch) -> Result<Vec<PlannedEntry>> {
        let config = self.project.build_config(arch, &self.base_dir)?;
        let compiler = self.compiler();
        plan(
            &self.project.layout(),
            &config,
            &self.output_dir(arch),
            compiler.as_ref().map(|c| c as &dyn Compiler),
        )
    }

    /// Run the whole build for `arch`.
    pub fn build(&self, arch: Arch) -> Result<BuildReport> {
        let config = self.project.build_config(arch, &self.base_dir)?;
        let output = self.output_dir(arch);
        let ctx = HookContext {
            arch,
            dist: output.clone(),
            project_root: self.base_dir.clone(),
        };

        if self.options.run_before {
            hooks::run_all(&self.project.hooks.before, &ctx)?;
        } else if !self.project.hooks.before.is_empty() {
            info!("Skipping {} before hooks", self.project.hooks.before.len());
        }

        let compiler = self.compiler();
        if let Some(compiler) = &compiler {
            compiler.probe()?;
        }

        create_dir(&output)?;
        for dir in &self.project.empty_dirs {
            create_dir(&join_subpath(&output, dir))?;
        }

        let files = process_layout(
            &self.project.layout(),
            &config,
            &output,
            compiler.as_ref().map(|c| c as &dyn Compiler),
        )?;

        if self.options.run_after {
            hooks::run_all(&self.project.hooks.after, &ctx)?;
        } else if !self.project.hooks.after.is_empty() {
            info!("Skipping {} after hooks", self.project.hooks.after.len());
        }

        Ok(BuildReport {
            arch,
            size: package_size(&output)?,
            output,
            files,
        })
    }
}

/// Number of bytes in the regular files under `dir`.
pub fn package_size(dir: &Path) -> Result<u64> {
    let mut size = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("Failed to walk '{}': {}", dir.display(), e),
        })?;
        if entry.file_type().is_file() {
            size += entry.metadata().map_err(|e| Error::Filesystem {
                message: format!("Failed to inspect '{}': {}", entry.path().display(), e),
            })?.len();
        }
    }
    Ok(size)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::Filesystem {
        message: format!("Failed to create directory '{}': {}", path.display(), e),
    })
}
