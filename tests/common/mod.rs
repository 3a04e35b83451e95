//! Shared fixtures for integration tests.
//!
//! Tests drive the real `git` binary against repositories created in
//! temporary directories: a "target" repository with the cdnjs layout and
//! one or more "upstream" library repositories to import from. The target
//! doubles as its own pull remote so no network access is needed.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

/// Runs a git command in `repo`, panicking with stderr on failure.
pub fn git(repo: &Path, args: &[&str]) {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        repo.display(),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Runs a git command in `repo` and returns trimmed stdout.
pub fn git_stdout(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        repo.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initializes a repository on a `master` branch with a test identity.
pub fn init_repo(path: &Path) {
    std::fs::create_dir_all(path).unwrap();
    git(path, &["init", "-b", "master"]);
    git(path, &["config", "user.email", "importer@example.test"]);
    git(path, &["config", "user.name", "Importer Tests"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}

/// Stages everything and commits.
pub fn commit_all(repo: &Path, message: &str) {
    git(repo, &["add", "-A", "."]);
    git(repo, &["commit", "-m", message]);
}

/// Creates a target repository with the cdnjs `ajax/libs` layout and an
/// initial commit, so it can serve as its own pull remote.
pub fn init_target_repo(root: &Path) {
    init_repo(root);
    std::fs::create_dir_all(root.join("ajax/libs")).unwrap();
    std::fs::write(root.join("ajax/libs/.gitkeep"), "").unwrap();
    commit_all(root, "Initial layout");
}

/// Creates an upstream library repository with the given `package.json`
/// contents and files (paths relative to the repository root).
pub fn init_upstream(root: &Path, package_json: &str, files: &[(&str, &str)]) {
    init_repo(root);
    std::fs::write(root.join("package.json"), package_json).unwrap();
    for (path, contents) in files {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, contents).unwrap();
    }
    commit_all(root, "Upstream release");
}

/// Lists local branches of a repository.
pub fn branches(repo: &Path) -> Vec<String> {
    git_stdout(repo, &["branch", "--format", "%(refname:short)"])
        .lines()
        .map(str::to_string)
        .collect()
}

/// The subject line of the most recent commit on a branch.
pub fn last_commit_subject(repo: &Path, branch: &str) -> String {
    git_stdout(repo, &["log", "-1", "--format=%s", branch])
}
