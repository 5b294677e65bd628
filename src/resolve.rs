//! Source root resolution
//!
//! Layout rules name their source with a symbolic token `<class>:<subpath>`.
//! The class picks one of the configured [`SourceRoots`]; the subpath is
//! joined onto it after the `$arch` placeholder has been replaced. Runtime
//! output is laid out by the runtime's own toolchain, so it receives the
//! toolchain spelling of the architecture instead of the public one.

use std::path::PathBuf;

use crate::arch::{self, Arch};
use crate::config::SourceRoots;
use crate::path::join_subpath;

/// Recognized source-root classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootClass {
    /// Output of the application build
    ApplicationOutput,
    /// Output of the runtime build
    RuntimeOutput,
    /// The project's own source tree
    ProjectSource,
}

impl RootClass {
    /// Parse the class part of a token.
    pub fn from_token(class: &str) -> Option<Self> {
        match class {
            "application-output" => Some(RootClass::ApplicationOutput),
            "runtime-output" => Some(RootClass::RuntimeOutput),
            "project-source" => Some(RootClass::ProjectSource),
            _ => None,
        }
    }

    /// Architecture name substituted into subpaths of this class.
    pub fn arch_name(self, arch: Arch) -> &'static str {
        match self {
            RootClass::RuntimeOutput => arch.toolchain_name(),
            RootClass::ApplicationOutput | RootClass::ProjectSource => arch.name(),
        }
    }

    fn base(self, roots: &SourceRoots) -> &std::path::Path {
        match self {
            RootClass::ApplicationOutput => &roots.application_output,
            RootClass::RuntimeOutput => &roots.runtime_output,
            RootClass::ProjectSource => &roots.project_source,
        }
    }
}

/// Resolve a source token to a concrete directory.
///
/// Returns `None` when the token has no `:` or names an unknown class; the
/// caller skips such rules.
pub fn resolve_root(token: &str, arch: Arch, roots: &SourceRoots) -> Option<PathBuf> {
    let (class, subpath) = token.split_once(':')?;
    let class = RootClass::from_token(class)?;
    let subpath = arch::substitute(subpath, class.arch_name(arch));
    Some(join_subpath(class.base(roots), &subpath))
}
