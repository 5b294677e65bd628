//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_config(configs::SETTINGS_ONLY)
//!         .with_file("src/settings.json", "{}");
//!     fixture.command().args(["build", "x86"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Project configurations used across tests.
#[allow(dead_code)]
pub mod configs {
    /// Copies the project settings file to the package root.
    pub const SETTINGS_ONLY: &str = r#"
output: dist/$arch
roots:
  project-source: src
layout:
  - target: /
    source: "project-source:"
    pattern: settings.json
"#;

    /// Runtime binaries and the standard library, the latter as an archive.
    pub const RUNTIME: &str = r#"
output: dist/$arch
roots:
  runtime-output: runtime
layout:
  - target: /
    source: "runtime-output:PCBuild/$arch"
    pattern: "*.dll"
    predicate: not-debug
  - target: pylib.zip
    source: "runtime-output:Lib"
    pattern: "**/*"
    predicate: library-content
compile:
  enabled: false
"#;

    /// Uses a section distpack does not know.
    pub const UNKNOWN_KEY: &str = "output: dist\nplugins: []\n";

    /// Not YAML at all.
    pub const INVALID_YAML: &str = "output: [unclosed";
}

/// A temporary project directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create an empty project.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `distpack.yaml` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("distpack.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a text file, creating parent directories.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a binary file, creating parent directories.
    #[allow(dead_code)]
    pub fn with_binary_file(self, path: &str, content: &[u8]) -> Self {
        self.temp_dir
            .child(path)
            .write_binary(content)
            .expect("Failed to write binary file");
        self
    }

    /// Add a minimal runtime tree for the `RUNTIME` config.
    #[allow(dead_code)]
    pub fn with_runtime(self, toolchain_arch: &str) -> Self {
        let bin = format!("runtime/PCBuild/{}", toolchain_arch);
        self.with_binary_file(&format!("{}/python35.dll", bin), &[0x4d, 0x5a, 0x90, 0x00])
            .with_binary_file(&format!("{}/python35_d.dll", bin), &[0x4d, 0x5a])
            .with_file("runtime/Lib/os.py", "import sys\n")
            .with_file("runtime/Lib/json/__init__.py", "\n")
            .with_file("runtime/Lib/test/test_os.py", "import unittest\n")
            .with_file("runtime/Lib/__pycache__/os.cpython-35.pyc", "stale")
    }

    /// Root of the project.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of `distpack.yaml`.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("distpack.yaml")
    }

    /// A path inside the project.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Command running the binary inside the project.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("distpack");
        cmd.current_dir(self.path()).env_remove("DISTPACK_CONFIG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Names of the entries in a zip archive, in archive order.
#[allow(dead_code)]
pub fn archive_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("Failed to open archive");
    let archive = zip::ZipArchive::new(file).expect("Failed to read archive");
    archive.file_names().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_config(configs::SETTINGS_ONLY);
        assert!(fixture.config_path().exists());
    }

    #[test]
    fn test_configs_parse() {
        for config in [configs::SETTINGS_ONLY, configs::RUNTIME] {
            distpack::config::parse(config).expect("Config should parse");
        }
        assert!(distpack::config::parse(configs::UNKNOWN_KEY).is_err());
        assert!(distpack::config::parse(configs::INVALID_YAML).is_err());
    }
}
