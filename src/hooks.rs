//! External build steps
//!
//! Everything around layout assembly (compiling the application, building
//! the runtime, installing third-party modules, generating an installer) is
//! done by external programs. distpack only runs them with fixed arguments
//! and checks whether they succeeded.

use std::path::PathBuf;
use std::process::Command;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::arch::{self, Arch};
use crate::error::{Error, Result};

/// Placeholder replaced by the package directory in hook arguments.
pub const DIST_PLACEHOLDER: &str = "$dist";

/// A single external command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookCommand {
    /// Name used in logs and error messages
    pub name: String,
    /// Program to execute
    pub program: String,
    /// Arguments; `$arch` and `$dist` are substituted
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory, relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// Commands run before and after layout processing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hooks {
    /// Steps producing the source trees
    pub before: Vec<HookCommand>,
    /// Steps consuming the finished package
    pub after: Vec<HookCommand>,
}

/// Values substituted into hook arguments
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Package architecture
    pub arch: Arch,
    /// Package directory
    pub dist: PathBuf,
    /// Directory relative working directories are resolved against
    pub project_root: PathBuf,
}

impl HookContext {
    fn expand(&self, value: &str) -> String {
        arch::substitute(value, self.arch.name())
            .replace(DIST_PLACEHOLDER, &self.dist.to_string_lossy())
    }
}

impl HookCommand {
    /// Run the command to completion.
    ///
    /// A missing program or a non-zero exit status is a build failure.
    pub fn run(&self, ctx: &HookContext) -> Result<()> {
        let args: Vec<String> = self.args.iter().map(|a| ctx.expand(a)).collect();
        let dir = self.working_dir(ctx);

        info!("Running build step '{}'", self.name);
        debug!("{} {} (in {})", self.program, args.join(" "), dir.display());

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&dir)
            .output()
            .map_err(|e| Error::Hook {
                step: self.name.clone(),
                message: format!("cannot execute '{}': {}", self.program, e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            debug!("[{}] {}", self.name, line);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Hook {
                step: self.name.clone(),
                message: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        info!("Build step '{}' finished", self.name);
        Ok(())
    }

    fn working_dir(&self, ctx: &HookContext) -> PathBuf {
        match &self.dir {
            Some(dir) => ctx.project_root.join(ctx.expand(dir)),
            None => ctx.project_root.clone(),
        }
    }
}

/// Run `commands` in order, stopping at the first failure.
pub fn run_all(commands: &[HookCommand], ctx: &HookContext) -> Result<()> {
    for command in commands {
        command.run(ctx)?;
    }
    Ok(())
}
