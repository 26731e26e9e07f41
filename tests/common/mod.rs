//! TestRepo helper for integration tests.
//!
//! Provides a temporary git repository with pinned identity and dates
//! so generated changelogs are deterministic.

use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

/// A temporary git repository for testing.
///
/// The repository is cleaned up when the TestRepo is dropped.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new git repository in a temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let repo = Self { dir };
        repo.git(&["init", "-q", "-b", "main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    /// Create a temporary directory that is not a repository at all.
    pub fn bare_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp directory")
    }

    /// Get the path to the repository root.
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Execute a git command in this repository.
    ///
    /// # Panics
    ///
    /// Panics if the command fails to execute or exits non-zero.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("Failed to execute git command");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!(
                "git {:?} failed with exit code {:?}:\n{}",
                args,
                output.status.code(),
                stderr
            );
        }

        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Create an empty commit with a pinned author/committer date.
    ///
    /// `date` is an ISO-8601 timestamp with offset, e.g.
    /// `2024-02-01T12:00:00+00:00`.
    pub fn commit(&self, subject: &str, date: &str) {
        let output = Command::new("git")
            .args(["commit", "--allow-empty", "-q", "-m", subject])
            .current_dir(self.dir.path())
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_DATE", date)
            .output()
            .expect("Failed to execute git commit");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("git commit failed:\n{}", stderr);
        }
    }

    /// Tag the current HEAD.
    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }
}
