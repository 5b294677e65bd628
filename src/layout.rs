//! # Layout Table
//!
//! A package layout is an ordered list of [`LayoutRule`]s. Each rule says:
//! take the files matching `pattern` under the source root named by
//! `source`, keep those the optional predicate accepts, and place them under
//! `target` in the package.
//!
//! Rules are plain data. They are built once, either from the built-in
//! [`default_layout`] or from the `layout:` section of a project
//! configuration file, and never change afterwards. Rules do not depend on
//! each other; their order only fixes the order in which files are written.

use serde::{Deserialize, Serialize};

use crate::predicates::PredicateName;

/// One declarative instruction of a package layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutRule {
    /// Output subdirectory relative to the package root (`/` for the root).
    ///
    /// A target ending in `.zip` is materialized as an archive.
    pub target: String,
    /// Symbolic source root, `<class>:<subpath>`.
    pub source: String,
    /// Glob pattern; a leading `**/` searches every descendant directory.
    pub pattern: String,
    /// Inclusion predicate; `None` accepts everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<PredicateName>,
}

impl LayoutRule {
    /// Create a rule that accepts every matching file.
    pub fn new(target: &str, source: &str, pattern: &str) -> Self {
        Self {
            target: target.to_string(),
            source: source.to_string(),
            pattern: pattern.to_string(),
            predicate: None,
        }
    }

    /// Attach an inclusion predicate.
    pub fn with_predicate(mut self, predicate: PredicateName) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Short human-readable form used in log lines.
    pub fn describe(&self) -> String {
        format!("{} <- {} [{}]", self.target, self.source, self.pattern)
    }
}

/// The built-in layout of an agent package.
///
/// Project files and the application executable land at the package root,
/// the application's installed modules under `pytool/`, and the runtime's
/// standard library and extension modules under `pylib/`.
pub fn default_layout() -> Vec<LayoutRule> {
    use PredicateName::{LibraryContent, NotDebug};

    vec![
        LayoutRule::new("/", "project-source:", "settings.json"),
        LayoutRule::new("/", "project-source:", "trust.pem"),
        LayoutRule::new("/", "application-output:", "EPControl.exe"),
        LayoutRule::new(
            "/",
            "application-output:pytool/Lib/site-packages/pypiwin32_system32",
            "*.dll",
        ),
        LayoutRule::new("pytool/", "application-output:", "servicemanager.pyd"),
        LayoutRule::new(
            "pytool/",
            "application-output:pytool/Lib/site-packages",
            "**/*",
        )
        .with_predicate(LibraryContent),
        LayoutRule::new("/", "runtime-output:PCBuild/$arch", "python35.dll")
            .with_predicate(NotDebug),
        LayoutRule::new("pylib/", "runtime-output:Lib", "**/*").with_predicate(LibraryContent),
        LayoutRule::new("pylib/lib-dynload/", "runtime-output:PCBuild/$arch", "*.pyd")
            .with_predicate(NotDebug),
        LayoutRule::new(
            "pylib/lib-dynload/",
            "runtime-output:PCBuild/$arch",
            "sqlite3.dll",
        )
        .with_predicate(NotDebug),
    ]
}
