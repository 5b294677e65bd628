//! Ahead-of-time bytecode compilation
//!
//! The materializer compiles eligible source files through the [`Compiler`]
//! trait. Failures come in two kinds (see [`CompileError`]): a rejected
//! source falls back to a verbatim copy, anything else stops the build.
//!
//! [`PythonCompiler`] is the production implementation. It runs the
//! configured interpreter's own bytecode compiler in a child process and maps
//! its exit status onto the two failure kinds.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::defaults;
use crate::error::CompileError;
use crate::path::{has_extension, replace_extension};

/// Extension of compilable source files.
pub const SOURCE_EXTENSION: &str = "py";

/// Extension of compiled artifacts.
pub const ARTIFACT_EXTENSION: &str = "pyc";

/// Exit status the helper script uses for a rejected source.
const REJECTED_EXIT_CODE: i32 = 3;

/// Compiles one source file and reports a rejected source as an exit code,
/// so the caller can tell it apart from interpreter failures.
const COMPILE_SCRIPT: &str = r#"
import sys, py_compile
try:
    py_compile.compile(sys.argv[1], sys.argv[2], sys.argv[3], doraise=True, optimize=int(sys.argv[4]))
except py_compile.PyCompileError as exc:
    sys.stderr.write(str(exc))
    sys.exit(3)
"#;

/// Source-to-bytecode compiler
pub trait Compiler {
    /// Compile `source` into `output`.
    ///
    /// `display_path` is the path recorded inside the artifact (what
    /// tracebacks show); it is the entry's path inside the package.
    fn compile(
        &self,
        source: &Path,
        output: &Path,
        display_path: &Path,
    ) -> std::result::Result<(), CompileError>;

    /// Whether an entry with this relative path should be compiled.
    fn is_eligible(&self, relative: &Path) -> bool {
        has_extension(relative, SOURCE_EXTENSION)
    }

    /// Destination of the compiled form of `relative`.
    fn artifact_path(&self, relative: &Path) -> PathBuf {
        replace_extension(relative, ARTIFACT_EXTENSION)
    }
}

/// Compiles with an external interpreter
#[derive(Debug, Clone)]
pub struct PythonCompiler {
    interpreter: PathBuf,
    optimize: u8,
}

impl PythonCompiler {
    /// Use `interpreter` at the highest optimization level.
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            optimize: defaults::MAX_OPTIMIZE_LEVEL,
        }
    }

    /// Override the optimization level.
    pub fn with_optimize(mut self, level: u8) -> Self {
        self.optimize = level.min(defaults::MAX_OPTIMIZE_LEVEL);
        self
    }

    /// Interpreter program
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Check that the interpreter runs and ships a bytecode compiler.
    ///
    /// Called once before a build so a broken environment fails before any
    /// file is written.
    pub fn probe(&self) -> std::result::Result<(), CompileError> {
        let output = Command::new(&self.interpreter)
            .args(["-c", "import py_compile"])
            .output()
            .map_err(|e| self.failure(&self.interpreter, format!("cannot execute interpreter: {}", e)))?;
        if !output.status.success() {
            return Err(self.failure(
                &self.interpreter,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }

    fn failure(&self, source: &Path, message: String) -> CompileError {
        CompileError::Failed {
            source_path: source.to_path_buf(),
            message,
        }
    }
}

impl Compiler for PythonCompiler {
    fn compile(
        &self,
        source: &Path,
        output: &Path,
        display_path: &Path,
    ) -> std::result::Result<(), CompileError> {
        let display = display_path.to_string_lossy().replace('\\', "/");
        debug!("Compiling {} -> {}", source.display(), output.display());

        let result = Command::new(&self.interpreter)
            .arg("-c")
            .arg(COMPILE_SCRIPT)
            .arg(source)
            .arg(output)
            .arg(&display)
            .arg(self.optimize.to_string())
            .output()
            .map_err(|e| self.failure(source, format!("cannot execute interpreter: {}", e)))?;

        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        match result.status.code() {
            Some(0) => Ok(()),
            Some(REJECTED_EXIT_CODE) => Err(CompileError::Rejected {
                source_path: source.to_path_buf(),
                message: stderr,
            }),
            _ => Err(self.failure(source, format!("{}: {}", result.status, stderr))),
        }
    }
}
