//! Platform-specific helpers.

/// Returns whether the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(target_os = "windows")
}

/// Returns the platform-appropriate git command name.
///
/// The returned name still relies on the executable being in PATH; use
/// [`crate::git::ensure_git_available`] to verify that.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() { "git.exe" } else { "git" }
}
