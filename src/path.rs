//! Path manipulation utilities for distpack

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Recursive-descent markers accepted at the start of a pattern.
const RECURSIVE_MARKERS: [&str; 2] = ["**/", "**\\"];

/// Split a selection pattern into its recursion flag and the per-directory
/// remainder.
///
/// `"**/*.py"` becomes `(true, "*.py")`, `"*.dll"` stays `(false, "*.dll")`.
pub fn split_recursive(pattern: &str) -> (bool, &str) {
    for marker in RECURSIVE_MARKERS {
        if let Some(rest) = pattern.strip_prefix(marker) {
            return (true, rest);
        }
    }
    (false, pattern)
}

/// Join a `/`- or `\`-separated relative subpath onto `base`.
///
/// Empty components and `.` are dropped so `""`, `"/"` and `"./"` all
/// resolve to `base` itself.
pub fn join_subpath(base: &Path, subpath: &str) -> PathBuf {
    subpath
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .fold(base.to_path_buf(), |acc, part| acc.join(part))
}

/// Whether `path` has extension `ext` (compared case-insensitively).
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Replace the final extension of `path`, keeping every directory component.
pub fn replace_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

/// Render a relative path as an archive entry name (`/`-separated).
///
/// Rejects absolute paths and `..` components so nothing can escape the
/// archive root.
pub fn archive_name(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| Error::Path {
                    message: format!("Non UTF-8 path: {}", relative.display()),
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(Error::Path {
                    message: format!("Not a relative entry path: {}", relative.display()),
                })
            }
        }
    }
    if parts.is_empty() {
        return Err(Error::Path {
            message: "Empty entry path".to_string(),
        });
    }
    Ok(parts.join("/"))
}

/// Turn a layout target such as `"/"`, `"pylib/"` or `"pylib/lib-dynload/"`
/// into a path under `output_root`.
pub fn target_path(output_root: &Path, target: &str) -> PathBuf {
    join_subpath(output_root, target)
}
