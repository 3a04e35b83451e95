//! cdnjs-importer - imports third-party library releases into a local
//! cdnjs-style repository.
//!
//! The importer automates the manual steps of adding a library to a cdnjs
//! checkout: it pulls the target repository, clones the upstream into a
//! temporary directory, reads and normalizes the upstream `package.json`,
//! locates the distributable files, copies them into the version-pinned
//! layout (`ajax/libs/<name>/<version>/`), and commits the result on a
//! dedicated `importer-<name>-<version>` branch.
//!
//! # Architecture
//!
//! The crate is organized around the import pipeline:
//!
//! - [`importer`] - the pipeline controller: ordered stages, short-circuit
//!   on first error, concurrent batch fan-out
//! - [`descriptor`] - upstream `package.json` loading, source-directory
//!   probing, and the auto-update field policy
//! - [`locator`] - glob expansion of the file map and canonical filename
//!   derivation (with minified-variant preference)
//! - [`writer`] - destination layout creation, metadata write, concurrent
//!   file copy
//! - [`git`] - async wrapper over the system `git` binary
//! - [`core`] - error taxonomy and user-facing error formatting
//! - [`cli`] - the `cdnjs-import` binary surface
//!
//! # Example
//!
//! ```rust,no_run
//! use cdnjs_importer::importer::{CdnImporter, ImportRequest, ImporterOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let importer = CdnImporter::new(&ImporterOptions::new("/srv/cdnjs"))?;
//! let outcome = importer
//!     .import(&ImportRequest::new("https://github.com/example/lib.git"))
//!     .await?;
//! println!("imported {}@{} on {}", outcome.name, outcome.version, outcome.branch);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod constants;
pub mod core;
pub mod descriptor;
pub mod git;
pub mod importer;
pub mod locator;
pub mod utils;
pub mod writer;
