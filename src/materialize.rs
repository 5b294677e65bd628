//! # Materialization
//!
//! Writes selected files into the package. A [`Target`] is either a
//! directory tree or a zip archive; which one is decided by the target
//! path's extension.
//!
//! ## Compile or copy
//!
//! Every entry produces exactly one artifact:
//!
//! - an eligible source (see [`Compiler::is_eligible`]) is compiled, and the
//!   bytecode lands at the entry's path with its extension replaced;
//! - if the compiler rejects the source, or no compiler is configured, or
//!   the entry is not a source at all, the file is copied byte for byte to
//!   its original relative path.
//!
//! A rejected source never leaves a partial artifact behind. Any other
//! compiler failure aborts the build. Directory targets are written in
//! place, so whichever form of an entry the current build writes replaces
//! the other form left by an earlier build.
//!
//! ## Resources
//!
//! An archive target owns its zip writer and a scratch directory for
//! compiled artifacts. Both are released when the target is dropped, on
//! success or failure: the writer writes its central directory and the
//! scratch directory is deleted. [`Target::finish`] does the same but
//! reports finalization errors.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::compile::Compiler;
use crate::error::{Error, Result};
use crate::path::{archive_name, has_extension};
use crate::select::SelectionEntry;

/// Extension that turns a target into an archive.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Entries above this size need zip64 records.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Kind of materialization target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Directory,
    Archive,
}

impl TargetKind {
    /// Infer the kind from a target path.
    pub fn for_path(path: &Path) -> Self {
        if has_extension(path, ARCHIVE_EXTENSION) {
            TargetKind::Archive
        } else {
            TargetKind::Directory
        }
    }
}

/// What a single entry turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Compiled bytecode at this relative path
    Compiled(PathBuf),
    /// Verbatim copy at this relative path
    Copied(PathBuf),
}

impl Artifact {
    /// Relative destination of the artifact.
    pub fn path(&self) -> &Path {
        match self {
            Artifact::Compiled(path) | Artifact::Copied(path) => path,
        }
    }
}

enum Sink {
    Directory,
    Archive {
        writer: ZipWriter<File>,
        scratch: Option<TempDir>,
    },
}

/// An open output location
pub struct Target {
    path: PathBuf,
    sink: Sink,
    written: HashSet<PathBuf>,
}

impl Target {
    /// Open `path` for writing.
    ///
    /// Directories are created lazily as entries need them. An existing
    /// archive at `path` is deleted first; archives are never appended to.
    pub fn open(path: &Path) -> Result<Self> {
        let sink = match TargetKind::for_path(path) {
            TargetKind::Directory => Sink::Directory,
            TargetKind::Archive => {
                if path.exists() {
                    fs::remove_file(path).map_err(|e| Error::Filesystem {
                        message: format!("Failed to remove old archive '{}': {}", path.display(), e),
                    })?;
                }
                if let Some(parent) = path.parent() {
                    create_dir(parent)?;
                }
                let file = File::create(path).map_err(|e| Error::Filesystem {
                    message: format!("Failed to create archive '{}': {}", path.display(), e),
                })?;
                Sink::Archive {
                    writer: ZipWriter::new(file),
                    scratch: None,
                }
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            sink,
            written: HashSet::new(),
        })
    }

    /// Location of the target
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Kind of the target
    pub fn kind(&self) -> TargetKind {
        match self.sink {
            Sink::Directory => TargetKind::Directory,
            Sink::Archive { .. } => TargetKind::Archive,
        }
    }

    /// Number of artifacts written so far.
    pub fn len(&self) -> usize {
        self.written.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// Write one entry, compiling it when possible.
    pub fn write_entry(
        &mut self,
        entry: &SelectionEntry,
        compiler: Option<&dyn Compiler>,
    ) -> Result<Artifact> {
        if let Some(compiler) = compiler.filter(|c| c.is_eligible(&entry.relative)) {
            let artifact = compiler.artifact_path(&entry.relative);
            self.claim(&artifact)?;
            if self.write_compiled(entry, &artifact, compiler)? {
                return Ok(Artifact::Compiled(artifact));
            }
            self.written.remove(&artifact);
        }

        self.claim(&entry.relative)?;
        self.write_copy(&entry.source, &entry.relative)?;
        Ok(Artifact::Copied(entry.relative.clone()))
    }

    /// Close the target, finalizing an archive.
    pub fn finish(self) -> Result<()> {
        if let Sink::Archive { writer, scratch } = self.sink {
            writer.finish()?;
            drop(scratch);
        }
        Ok(())
    }

    #[cfg(test)]
    fn scratch_path(&self) -> Option<PathBuf> {
        match &self.sink {
            Sink::Archive {
                scratch: Some(dir), ..
            } => Some(dir.path().to_path_buf()),
            _ => None,
        }
    }

    fn claim(&mut self, relative: &Path) -> Result<()> {
        if !self.written.insert(relative.to_path_buf()) {
            return Err(Error::DuplicateEntry {
                target: self.path.clone(),
                path: relative.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Returns `false` when the compiler rejected the source.
    fn write_compiled(
        &mut self,
        entry: &SelectionEntry,
        artifact: &Path,
        compiler: &dyn Compiler,
    ) -> Result<bool> {
        let output = match &mut self.sink {
            Sink::Directory => {
                let output = self.path.join(artifact);
                if let Some(parent) = output.parent() {
                    create_dir(parent)?;
                }
                output
            }
            Sink::Archive { scratch, .. } => {
                let dir = match scratch.take() {
                    Some(dir) => dir,
                    None => TempDir::new()?,
                };
                let output = dir
                    .path()
                    .join(artifact.file_name().unwrap_or(artifact.as_os_str()));
                *scratch = Some(dir);
                output
            }
        };

        match compiler.compile(&entry.source, &output, &entry.relative) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                debug!("{}; copying verbatim", e);
                remove_if_exists(&output)?;
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        match &mut self.sink {
            // A verbatim copy left by an earlier build whose compile was rejected
            Sink::Directory if !self.written.contains(&entry.relative) => {
                remove_if_exists(&self.path.join(&entry.relative))?;
            }
            Sink::Directory => {}
            Sink::Archive { writer, .. } => {
                add_to_archive(writer, &output, artifact)?;
                remove_if_exists(&output)?;
            }
        }
        Ok(true)
    }

    fn write_copy(&mut self, source: &Path, relative: &Path) -> Result<()> {
        match &mut self.sink {
            Sink::Directory => {
                let dest = self.path.join(relative);
                if let Some(parent) = dest.parent() {
                    create_dir(parent)?;
                }
                fs::copy(source, &dest).map_err(|e| Error::Filesystem {
                    message: format!(
                        "Failed to copy '{}' to '{}': {}",
                        source.display(),
                        dest.display(),
                        e
                    ),
                })?;
                Ok(())
            }
            Sink::Archive { writer, .. } => add_to_archive(writer, source, relative),
        }
    }
}

/// Write `entries` into a fresh target at `target` and close it.
///
/// Returns the number of entries processed.
pub fn materialize<I>(target: &Path, entries: I, compiler: Option<&dyn Compiler>) -> Result<usize>
where
    I: IntoIterator<Item = Result<SelectionEntry>>,
{
    let mut output = Target::open(target)?;
    let mut count = 0;
    for entry in entries {
        output.write_entry(&entry?, compiler)?;
        count += 1;
    }
    output.finish()?;
    Ok(count)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::Filesystem {
        message: format!("Failed to create directory '{}': {}", path.display(), e),
    })
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Filesystem {
            message: format!("Failed to remove '{}': {}", path.display(), e),
        }),
    }
}

fn add_to_archive(writer: &mut ZipWriter<File>, source: &Path, relative: &Path) -> Result<()> {
    let name = archive_name(relative)?;
    let metadata = fs::metadata(source)?;

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= ZIP64_THRESHOLD);
    #[cfg(unix)]
    let options = {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode())
    };

    writer.start_file(name, options)?;
    let mut file = File::open(source).map_err(|e| Error::Filesystem {
        message: format!("Failed to read '{}': {}", source.display(), e),
    })?;
    io::copy(&mut file, writer)?;
    Ok(())
}
