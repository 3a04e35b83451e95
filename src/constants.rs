//! Fixed policy values of the import pipeline.
//!
//! These are conventions of the cdnjs repository layout and of the import
//! process itself, not tunables; anything a caller may legitimately vary
//! lives in [`crate::importer::ImporterOptions`] instead.

/// Subpath of the target repository that holds every imported library.
pub const LIBS_SUBPATH: &str = "ajax/libs";

/// The descriptor filename expected at the upstream repository root and
/// written at the library level of the destination.
pub const PACKAGE_JSON: &str = "package.json";

/// Remote the target repository is pulled from before each import, unless
/// overridden.
pub const DEFAULT_REMOTE: &str = "https://github.com/cdnjs/cdnjs.git";

/// Candidate source directories probed in order when no override is given.
/// The final `/` entry always exists, so probing cannot come up empty.
pub const SOURCE_DIR_CANDIDATES: [&str; 4] = ["/dist", "/build", "/src", "/"];

/// Glob pattern of the default file map entry, spanning everything under
/// the resolved source directory.
pub const DEFAULT_FILE_PATTERN: &str = "**/*";

/// Prefix of the branch each import is committed on.
pub const BRANCH_PREFIX: &str = "importer-";
