//! Default values for distpack configuration.
//!
//! This module provides centralized default values used by the config
//! loader and the CLI, so a project without a config file still builds the
//! standard package layout.

/// Name of the project configuration file looked up by the CLI.
pub const DEFAULT_CONFIG_FILENAME: &str = "distpack.yaml";

/// Package directory, relative to the project root.
pub const DEFAULT_OUTPUT: &str = "dist/$arch";

/// Application build output root.
pub const DEFAULT_APPLICATION_OUTPUT: &str = "build/tmp/$arch";

/// Runtime build output root.
pub const DEFAULT_RUNTIME_OUTPUT: &str = "build/python/$arch";

/// Project source root.
pub const DEFAULT_PROJECT_SOURCE: &str = ".";

/// Directories every package starts with, relative to the package root.
pub const DEFAULT_EMPTY_DIRS: &[&str] = &["logs"];

/// Interpreter used to compile sources to bytecode.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Highest optimization level the bytecode compiler accepts.
pub const MAX_OPTIMIZE_LEVEL: u8 = 2;
