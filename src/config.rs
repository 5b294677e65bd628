//! # Configuration Schema and Parsing
//!
//! This module defines the project configuration file (`distpack.yaml`) and
//! the immutable [`BuildConfig`] derived from it for one build.
//!
//! ## Key Components
//!
//! - **`ProjectConfig`**: the file as written by the user. Every section is
//!   optional; an empty file (or no file at all) yields the built-in layout
//!   and default source roots.
//!
//! - **`SourceRoots`**: the three base paths symbolic source tokens resolve
//!   against (application build output, runtime build output, project
//!   source).
//!
//! - **`BuildConfig`**: architecture, resolved roots and predicate settings.
//!   It is constructed once per invocation with every `$arch` placeholder
//!   substituted and every relative path anchored, and it is never modified
//!   afterwards. The resolver, selector and materializer only ever see it by
//!   shared reference.
//!
//! ## Path Resolution
//!
//! Relative paths in the file are resolved against the directory containing
//! the file, so a build behaves the same regardless of the working directory
//! it is started from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::arch::{self, Arch};
use crate::defaults;
use crate::error::{Error, Result};
use crate::hooks::Hooks;
use crate::layout::{default_layout, LayoutRule};
use crate::predicates::Filters;

/// Base paths of the three source-root classes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoots {
    /// Application build output (`application-output:`)
    pub application_output: PathBuf,
    /// Runtime build output (`runtime-output:`)
    pub runtime_output: PathBuf,
    /// Project source tree (`project-source:`)
    pub project_source: PathBuf,
}

/// Immutable configuration of a single build
#[derive(Debug, Clone)]
pub struct BuildConfig {
    arch: Arch,
    roots: SourceRoots,
    filters: Filters,
}

impl BuildConfig {
    /// Create a build configuration.
    pub fn new(arch: Arch, roots: SourceRoots, filters: Filters) -> Self {
        Self {
            arch,
            roots,
            filters,
        }
    }

    /// Package architecture
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Source root base paths
    pub fn roots(&self) -> &SourceRoots {
        &self.roots
    }

    /// Predicate settings
    pub fn filters(&self) -> &Filters {
        &self.filters
    }
}

/// Source root section of the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RootsConfig {
    pub application_output: String,
    pub runtime_output: String,
    pub project_source: String,
}

impl Default for RootsConfig {
    fn default() -> Self {
        Self {
            application_output: defaults::DEFAULT_APPLICATION_OUTPUT.to_string(),
            runtime_output: defaults::DEFAULT_RUNTIME_OUTPUT.to_string(),
            project_source: defaults::DEFAULT_PROJECT_SOURCE.to_string(),
        }
    }
}

/// Bytecode compilation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileSettings {
    /// Compile eligible sources; when false every file is copied verbatim.
    pub enabled: bool,
    /// Interpreter program used for compilation.
    pub interpreter: String,
    /// Optimization level passed to the compiler.
    pub optimize: u8,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interpreter: defaults::DEFAULT_INTERPRETER.to_string(),
            optimize: defaults::MAX_OPTIMIZE_LEVEL,
        }
    }
}

/// The `distpack.yaml` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Package directory; may reference `$arch`.
    pub output: String,
    /// Source root base paths; may reference `$arch`.
    pub roots: RootsConfig,
    /// Layout table replacing the built-in one.
    pub layout: Option<Vec<LayoutRule>>,
    /// Predicate settings
    pub filters: Filters,
    /// Bytecode compilation settings
    pub compile: CompileSettings,
    /// Directories created empty in the package (e.g. for logs).
    pub empty_dirs: Vec<String>,
    /// External build steps
    pub hooks: Hooks,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            output: defaults::DEFAULT_OUTPUT.to_string(),
            roots: RootsConfig::default(),
            layout: None,
            filters: Filters::default(),
            compile: CompileSettings::default(),
            empty_dirs: defaults::DEFAULT_EMPTY_DIRS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            hooks: Hooks::default(),
        }
    }
}

impl ProjectConfig {
    /// The configured layout table, or the built-in one.
    pub fn layout(&self) -> Vec<LayoutRule> {
        self.layout.clone().unwrap_or_else(default_layout)
    }

    /// Freeze the configuration for a build of `arch`.
    ///
    /// `base_dir` anchors relative root paths, normally the directory that
    /// contains the config file.
    pub fn build_config(&self, arch: Arch, base_dir: &Path) -> Result<BuildConfig> {
        let roots = SourceRoots {
            application_output: anchor_root(
                "application-output",
                &self.roots.application_output,
                arch,
                base_dir,
            )?,
            runtime_output: anchor_root("runtime-output", &self.roots.runtime_output, arch, base_dir)?,
            project_source: anchor_root("project-source", &self.roots.project_source, arch, base_dir)?,
        };
        Ok(BuildConfig::new(arch, roots, self.filters.clone()))
    }

    /// Package directory for `arch`, anchored at `base_dir`.
    pub fn output_dir(&self, arch: Arch, base_dir: &Path) -> PathBuf {
        base_dir.join(arch::substitute(&self.output, arch.name()))
    }

    /// Reject settings that cannot produce a working build.
    pub fn validate(&self) -> Result<()> {
        if self.compile.optimize > defaults::MAX_OPTIMIZE_LEVEL {
            return Err(Error::ConfigParse {
                message: format!("compile.optimize must be at most {}", defaults::MAX_OPTIMIZE_LEVEL),
                hint: Some(format!("Use {} for fully optimized bytecode", defaults::MAX_OPTIMIZE_LEVEL)),
            });
        }
        if self.compile.enabled && self.compile.interpreter.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: "compile.interpreter is empty".to_string(),
                hint: Some("Set compile.enabled: false to copy sources verbatim".to_string()),
            });
        }
        if let Some(layout) = &self.layout {
            for rule in layout {
                if rule.pattern.trim().is_empty() {
                    return Err(Error::ConfigParse {
                        message: format!("layout rule '{}' has an empty pattern", rule.describe()),
                        hint: None,
                    });
                }
            }
        }
        Ok(())
    }
}

fn anchor_root(class: &str, template: &str, arch: Arch, base_dir: &Path) -> Result<PathBuf> {
    if template.trim().is_empty() {
        return Err(Error::ConfigParse {
            message: format!("root '{}' is empty", class),
            hint: Some(format!("Set roots.{} in {}", class, defaults::DEFAULT_CONFIG_FILENAME)),
        });
    }
    Ok(base_dir.join(arch::substitute(template, arch.name())))
}

/// Parse a configuration from YAML text.
///
/// An empty document is the default configuration.
pub fn parse(yaml_content: &str) -> Result<ProjectConfig> {
    if yaml_content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }
    let config: ProjectConfig = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })?;
    config.validate()?;
    Ok(config)
}

/// Read and parse a configuration file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
