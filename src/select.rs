//! # File Selection
//!
//! [`Selector`] turns a source root, a pattern and an optional inclusion
//! predicate into a lazy sequence of [`SelectionEntry`] values, one per
//! selected file.
//!
//! ## Patterns
//!
//! - `*.pyd`, `python35.dll`: evaluated once against the root. Only files
//!   are yielded.
//! - `**/*`, `**/*.py`: breadth-first search. The remainder after `**/` is
//!   evaluated against the root and then against every directory the
//!   predicate accepts. A rejected directory cuts its whole subtree: nothing
//!   below it is visited, whatever the predicate would say about it.
//!
//! ## Ordering
//!
//! The glob engine yields the entries of a directory sorted by name, and
//! directories are processed in the order they were discovered, so the
//! output order depends only on the tree's contents.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, Paths};

use crate::error::{Error, Result};
use crate::path::split_recursive;
use crate::predicates::{EntryKind, Inclusion};

/// A selected file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    /// Path of the file on disk
    pub source: PathBuf,
    /// Path relative to the resolved root; also its destination path
    pub relative: PathBuf,
}

/// Lazy, filtered file walk under one source root
pub struct Selector<'a> {
    root: PathBuf,
    pattern: String,
    recursive: bool,
    predicate: Option<&'a dyn Inclusion>,
    pending: VecDeque<PathBuf>,
    current: Option<Paths>,
}

impl<'a> Selector<'a> {
    /// Prepare a selection. Nothing is read from disk until iteration.
    pub fn new(
        root: impl Into<PathBuf>,
        pattern: &str,
        predicate: Option<&'a dyn Inclusion>,
    ) -> Result<Self> {
        let (recursive, remainder) = split_recursive(pattern);
        if remainder.is_empty() {
            return Err(Error::Pattern {
                pattern: pattern.to_string(),
                message: "nothing to match after the recursive marker".to_string(),
            });
        }
        Pattern::new(remainder).map_err(|e| Error::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let root = root.into();
        Ok(Self {
            pending: VecDeque::from([root.clone()]),
            root,
            pattern: remainder.to_string(),
            recursive,
            predicate,
            current: None,
        })
    }

    /// Root the relative paths are computed against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn accepts(&self, path: &Path, kind: EntryKind) -> bool {
        self.predicate.map_or(true, |p| p.accepts(path, kind))
    }

    fn expand(&self, dir: &Path) -> Result<Paths> {
        let dir_str = dir.to_str().ok_or_else(|| Error::Path {
            message: format!("Non UTF-8 source directory: {}", dir.display()),
        })?;
        let full = format!(
            "{}{}{}",
            Pattern::escape(dir_str),
            std::path::MAIN_SEPARATOR,
            self.pattern
        );
        Ok(glob::glob_with(&full, match_options())?)
    }

    /// Decide what to do with one glob match.
    fn visit(&mut self, path: PathBuf) -> Result<Option<SelectionEntry>> {
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            // Dangling symlink: neither a file nor a directory
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Filesystem {
                    message: format!("Failed to inspect '{}': {}", path.display(), e),
                })
            }
        };

        if metadata.is_dir() {
            if self.recursive && self.accepts(&path, EntryKind::Directory) {
                self.pending.push_back(path);
            }
            return Ok(None);
        }

        if metadata.is_file() && self.accepts(&path, EntryKind::File) {
            let relative = path
                .strip_prefix(&self.root)
                .map_err(|_| Error::Path {
                    message: format!(
                        "'{}' is not under '{}'",
                        path.display(),
                        self.root.display()
                    ),
                })?
                .to_path_buf();
            return Ok(Some(SelectionEntry {
                source: path,
                relative,
            }));
        }

        Ok(None)
    }
}

impl Iterator for Selector<'_> {
    type Item = Result<SelectionEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(paths) = self.current.as_mut() {
                match paths.next() {
                    Some(Ok(path)) => match self.visit(path) {
                        Ok(Some(entry)) => return Some(Ok(entry)),
                        Ok(None) => continue,
                        Err(e) => return Some(Err(e)),
                    },
                    Some(Err(e)) => return Some(Err(e.into())),
                    None => self.current = None,
                }
            }

            let dir = self.pending.pop_front()?;
            match self.expand(&dir) {
                Ok(paths) => self.current = Some(paths),
                Err(e) => {
                    self.pending.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: !cfg!(windows),
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Collect a whole selection, stopping at the first error.
pub fn select_all(
    root: &Path,
    pattern: &str,
    predicate: Option<&dyn Inclusion>,
) -> Result<Vec<SelectionEntry>> {
    Selector::new(root, pattern, predicate)?.collect()
}
