//! # Inclusion Predicates
//!
//! Named rules deciding whether a filesystem entry belongs in a package.
//! Layout rules refer to them by [`PredicateName`]; the selector evaluates
//! them through the [`Inclusion`] trait on every directory and file it meets.
//!
//! Predicates are pure: they look at the path, its name, its suffix and the
//! names of its ancestors, plus the entry kind the selector already knows.
//! They never open files or query the filesystem.
//!
//! Two families exist:
//!
//! - **Build-artifact filter** ([`ArtifactFilter`], `not-debug`): drops debug
//!   builds, optional GUI-toolkit binaries and self-test modules.
//! - **Library-content filter** ([`LibraryFilter`], `library-content`): drops
//!   caches, tooling, packaging metadata, test suites and compiled leftovers.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Binaries built in debug mode carry a `_d` marker before the extension.
static DEBUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)_d\.(pyd|dll|exe)$").expect("debug pattern is valid")
});

/// Optional GUI toolkit binaries (Tk and Tcl).
static TOOLKIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(_?tk|tcl).+\.(pyd|dll)").expect("toolkit pattern is valid")
});

static DEFAULT_FILTERS: LazyLock<Filters> = LazyLock::new(Filters::default);

/// What the selector found at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// Capability shared by every inclusion predicate
pub trait Inclusion {
    /// Whether the entry at `path` belongs in the output.
    fn accepts(&self, path: &Path, kind: EntryKind) -> bool;
}

/// Name of a predicate as written in a layout table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PredicateName {
    /// Build-artifact filter
    NotDebug,
    /// Library-content filter
    LibraryContent,
}

impl PredicateName {
    /// The name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            PredicateName::NotDebug => "not-debug",
            PredicateName::LibraryContent => "library-content",
        }
    }
}

/// Rejects debug builds, optional toolkit binaries and self-test modules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactFilter {
    /// File names dropped outright (case-insensitive).
    pub excluded_modules: BTreeSet<String>,
}

impl Default for ArtifactFilter {
    fn default() -> Self {
        Self {
            excluded_modules: to_set(&[
                "_ctypes_test.pyd",
                "_testbuffer.pyd",
                "_testcapi.pyd",
                "_testimportmultiple.pyd",
                "_testmultiphase.pyd",
                "xxlimited.pyd",
            ]),
        }
    }
}

impl Inclusion for ArtifactFilter {
    fn accepts(&self, path: &Path, _kind: EntryKind) -> bool {
        let name = file_name(path);
        if DEBUG_RE.is_match(&name) || TOOLKIT_RE.is_match(&name) {
            return false;
        }
        !contains_ci(&self.excluded_modules, &name)
    }
}

/// Keeps genuine library content, drops packaging and test noise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryFilter {
    /// Directory names dropped outright (case-insensitive).
    pub excluded_dirs: BTreeSet<String>,
    /// Directory name prefixes marking platform-variant trees.
    pub excluded_dir_prefixes: Vec<String>,
    /// Directory name suffixes marking distribution metadata.
    pub excluded_dir_suffixes: Vec<String>,
    /// Names of test-suite directories.
    pub test_dirs: BTreeSet<String>,
    /// Library roots under which test-suite directories are dropped.
    pub library_roots: BTreeSet<String>,
    /// File names dropped outright (case-insensitive).
    pub excluded_files: BTreeSet<String>,
    /// File extensions dropped, with the leading dot.
    pub excluded_extensions: BTreeSet<String>,
}

impl Default for LibraryFilter {
    fn default() -> Self {
        Self {
            excluded_dirs: to_set(&[
                "__pycache__",
                "ensurepip",
                "idlelib",
                "pydoc_data",
                "site-packages",
                "tkinter",
                "turtledemo",
                "venv",
                "pypiwin32_system32",
            ]),
            excluded_dir_prefixes: vec!["plat-".to_string()],
            excluded_dir_suffixes: vec![".dist-info".to_string(), ".egg-info".to_string()],
            test_dirs: to_set(&["test", "tests"]),
            library_roots: to_set(&["pytool", "lib"]),
            excluded_files: to_set(&["bdist_wininst.py"]),
            excluded_extensions: to_set(&[".pyc", ".pyo", ".exe"]),
        }
    }
}

impl LibraryFilter {
    fn accepts_dir(&self, path: &Path) -> bool {
        let name = file_name(path).to_lowercase();
        if contains_ci(&self.excluded_dirs, &name) {
            return false;
        }
        if self
            .excluded_dir_prefixes
            .iter()
            .any(|prefix| name.starts_with(&prefix.to_lowercase()))
        {
            return false;
        }
        if self
            .excluded_dir_suffixes
            .iter()
            .any(|suffix| name.ends_with(&suffix.to_lowercase()))
        {
            return false;
        }
        if contains_ci(&self.test_dirs, &name) {
            let mut ancestors = path.ancestors().skip(1).take(2);
            let under_library_root = ancestors.any(|ancestor| {
                ancestor
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| contains_ci(&self.library_roots, n))
            });
            if under_library_root {
                return false;
            }
        }
        true
    }

    fn accepts_file(&self, path: &Path) -> bool {
        let name = file_name(path);
        if contains_ci(&self.excluded_files, &name) {
            return false;
        }
        let suffix = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        suffix.is_empty() || !contains_ci(&self.excluded_extensions, &suffix)
    }
}

impl Inclusion for LibraryFilter {
    fn accepts(&self, path: &Path, kind: EntryKind) -> bool {
        match kind {
            EntryKind::Directory => self.accepts_dir(path),
            EntryKind::File => self.accepts_file(path),
        }
    }
}

/// Configured instances of every predicate family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Filters {
    /// Build-artifact filter configuration
    pub artifact: ArtifactFilter,
    /// Library-content filter configuration
    pub library: LibraryFilter,
}

impl Filters {
    /// Look up the predicate a layout rule refers to.
    pub fn get(&self, name: PredicateName) -> &dyn Inclusion {
        match name {
            PredicateName::NotDebug => &self.artifact,
            PredicateName::LibraryContent => &self.library,
        }
    }
}

/// Build-artifact filter with default settings.
pub fn is_not_debug(path: &Path) -> bool {
    DEFAULT_FILTERS.artifact.accepts(path, EntryKind::File)
}

/// Library-content filter with default settings.
pub fn include_in_lib(path: &Path, kind: EntryKind) -> bool {
    DEFAULT_FILTERS.library.accepts(path, kind)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn contains_ci(set: &BTreeSet<String>, value: &str) -> bool {
    set.iter().any(|item| item.eq_ignore_ascii_case(value))
}

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}
