//! # Error Handling
//!
//! This module defines the centralized error type for `distpack`. It uses the
//! `thiserror` library to describe every failure that can abort a package
//! build, with enough context (paths, patterns, hook names) to tell the user
//! what went wrong.
//!
//! ## Key Components
//!
//! - **`Error`**: every fatal condition of a build. Anything that reaches the
//!   caller as an `Error` aborts the build; there is no partial-success report
//!   beyond what was already written to disk.
//!
//! - **`CompileError`**: the two outcomes of a failed bytecode compilation.
//!   `Rejected` means the source text itself could not be compiled and the
//!   materializer falls back to a verbatim copy. `Failed` means the compiler
//!   environment is broken and the build must stop.
//!
//! - **`Result<T>`**: a type alias for `std::result::Result<T, Error>`.
//!
//! Rules whose source token names an unknown root class are not errors at
//! all: the resolver reports them as skipped.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for distpack operations
#[derive(Error, Debug)]
pub enum Error {
    /// The project configuration file could not be parsed or is inconsistent.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An architecture name outside the supported set was requested.
    #[error("Unknown architecture '{value}' (expected one of: x86, x64)")]
    UnknownArch { value: String },

    /// A layout rule carries a pattern the selector cannot evaluate.
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// A filesystem operation on the package output failed.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// A path could not be expressed the way the operation needs it.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// Two entries of one build were written to the same destination.
    #[error("Duplicate destination '{}' in target '{}'", path.display(), target.display())]
    DuplicateEntry { target: PathBuf, path: PathBuf },

    /// Bytecode compilation failed in a way that must abort the build.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// An external build step reported failure.
    #[error("Build step '{step}' failed: {message}")]
    Hook { step: String, message: String },

    /// An archive could not be created or written.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A directory could not be read while expanding a glob.
    #[error("Glob traversal error: {0}")]
    GlobWalk(#[from] glob::GlobError),
}

/// Failure modes of an ahead-of-time compilation attempt.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The source text was rejected (syntax or encoding error). Recoverable:
    /// the entry is copied verbatim instead.
    #[error("cannot compile {}: {message}", source_path.display())]
    Rejected {
        source_path: PathBuf,
        message: String,
    },

    /// The compiler itself could not do its job. Fatal.
    #[error("compiler failure on {}: {message}", source_path.display())]
    Failed {
        source_path: PathBuf,
        message: String,
    },
}

impl CompileError {
    /// Whether the materializer may fall back to a raw copy.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CompileError::Rejected { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
