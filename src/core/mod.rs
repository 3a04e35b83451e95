//! Core types and error handling for the importer.
//!
//! This module hosts the error taxonomy shared by every pipeline stage and
//! the user-facing error formatting used by the CLI.

pub mod error;

pub use error::{ErrorContext, ImporterError, user_friendly_error};
