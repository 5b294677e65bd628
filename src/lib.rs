//! # distpack
//!
//! Assembles a distribution package from several build output trees: the
//! compiled application, the language runtime and the project's own files.
//! A declarative layout table says which files go where; selected Python
//! sources are compiled to bytecode on the way, and targets ending in `.zip`
//! are written as compressed archives.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::path::Path;
//! use distpack::arch::Arch;
//! use distpack::config;
//! use distpack::package::process_layout;
//!
//! let project = config::parse("output: dist/$arch\n").unwrap();
//! let build = project.build_config(Arch::X86, Path::new("/project")).unwrap();
//! let copied = process_layout(
//!     &project.layout(),
//!     &build,
//!     &project.output_dir(Arch::X86, Path::new("/project")),
//!     None,
//! )
//! .unwrap();
//! println!("{} files", copied);
//! ```
//!
//! ## Core Concepts
//!
//! - **Layout (`layout`)**: ordered rules `(target, source token, pattern,
//!   predicate)`; a built-in table is used unless the config replaces it.
//! - **Resolution (`resolve`, `arch`)**: a token such as
//!   `runtime-output:PCBuild/$arch` becomes a concrete directory for the
//!   package architecture.
//! - **Selection (`select`, `predicates`)**: a lazy breadth-first walk that
//!   yields matching files, pruning whole subtrees the predicate rejects.
//! - **Materialization (`materialize`, `compile`)**: each selected file is
//!   compiled or copied into a directory or a zip archive.
//! - **Assembly (`package`, `hooks`)**: the full build, with external build
//!   steps run before and after the layout.
//!
//! ## Configuration
//!
//! A project is described by `distpack.yaml` (see `config`). One immutable
//! `config::BuildConfig` is derived from it per build and passed by
//! reference to every stage.

pub mod arch;
pub mod compile;
pub mod config;
pub mod defaults;
pub mod error;
pub mod hooks;
pub mod layout;
pub mod materialize;
pub mod output;
pub mod package;
pub mod path;
pub mod predicates;
pub mod resolve;
pub mod select;
pub mod suggestions;

#[cfg(test)]
mod path_proptest;
