//! Cross-platform utilities supporting the import pipeline.

pub mod fs;
pub mod platform;
