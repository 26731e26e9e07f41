//! Git history access for the changelog generator.
//!
//! Commits are read with a unit-separator (`%x1f`) log format so
//! subjects containing pipes cannot corrupt parsing; the subject is
//! the final field. Only tags that parse as semantic versions
//! (optional leading `v`) are kept on a commit.

use std::path::Path;
use std::process::Command;

use chrono::NaiveDate;
use semver::Version;
use serde::Serialize;

use crate::core::error::{Error, Result};

const FIELD_SEPARATOR: char = '\u{1f}';

// hash, author, short date, decorations, subject
const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%ad%x1f%d%x1f%s";

/// One commit parsed from a line of `git log` output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub date: NaiveDate,
    pub subject: String,
    /// Semver release tags pointing at this commit.
    pub tags: Vec<Version>,
}

/// Commit range selection: `from..to`, `from..HEAD`, history reachable
/// from `to`, or full history.
#[derive(Debug, Clone, Default)]
pub struct LogRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl LogRange {
    fn to_arg(&self) -> Option<String> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Some(format!("{}..{}", from, to)),
            (Some(from), None) => Some(format!("{}..HEAD", from)),
            (None, Some(to)) => Some(to.clone()),
            (None, None) => None,
        }
    }
}

fn execute_git(dir: &Path, args: &[&str]) -> Result<std::process::Output> {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| {
            Error::internal_io(format!("Failed to run git: {}", e), Some("git".to_string()))
        })
}

/// Check whether `dir` is inside a git working tree.
pub fn is_repository(dir: &Path) -> bool {
    execute_git(dir, &["rev-parse", "--is-inside-work-tree"])
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Read commits in the given range, newest first.
///
/// Fails with `history.not_found` when `dir` has no repository or the
/// range selects zero commits, and with `git.command_failed` when git
/// itself rejects the invocation (the message carries git's stderr).
pub fn log_commits(dir: &Path, range: &LogRange) -> Result<Vec<CommitRecord>> {
    if !is_repository(dir) {
        return Err(Error::history_not_found("Not inside a git repository")
            .with_hint("Run from a directory with version-control history"));
    }

    let mut args = vec!["log", "--date=short", LOG_FORMAT];
    let range_arg = range.to_arg();
    if let Some(arg) = &range_arg {
        args.push(arg);
    }

    let output = execute_git(dir, &args)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.contains("does not have any commits yet") {
            return Err(Error::history_not_found("Repository has no commits"));
        }
        return Err(Error::git_command_failed(format!(
            "git log failed: {}",
            stderr
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let commits: Vec<CommitRecord> = stdout.lines().filter_map(parse_log_line).collect();

    if commits.is_empty() {
        let described = range_arg.unwrap_or_else(|| "history".to_string());
        return Err(Error::history_not_found(format!(
            "No commits found in {}",
            described
        )));
    }

    Ok(commits)
}

fn parse_log_line(line: &str) -> Option<CommitRecord> {
    let mut parts = line.splitn(5, FIELD_SEPARATOR);
    let hash = parts.next()?;
    let author = parts.next()?;
    let date = parts.next()?;
    let decorations = parts.next()?;
    let subject = parts.next()?;

    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;

    Some(CommitRecord {
        hash: hash.to_string(),
        author: author.to_string(),
        date,
        subject: subject.trim().to_string(),
        tags: parse_decorations(decorations),
    })
}

/// Extract semver tags from a `%d` decoration string like
/// ` (HEAD -> main, tag: v1.2.0, tag: latest)`.
pub(crate) fn parse_decorations(decorations: &str) -> Vec<Version> {
    decorations
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .filter_map(|part| part.trim().strip_prefix("tag: "))
        .filter_map(parse_semver_tag)
        .collect()
}

/// Parse a tag as a semantic version, tolerating a leading `v`.
pub(crate) fn parse_semver_tag(tag: &str) -> Option<Version> {
    Version::parse(tag.strip_prefix('v').unwrap_or(tag)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decorations_with_mixed_refs() {
        let tags = parse_decorations(" (HEAD -> main, tag: v1.2.0, tag: latest, origin/main)");
        assert_eq!(tags, vec![Version::new(1, 2, 0)]);
    }

    #[test]
    fn parses_multiple_semver_tags() {
        let tags = parse_decorations(" (tag: v0.9.9, tag: 1.0.0)");
        assert_eq!(tags, vec![Version::new(0, 9, 9), Version::new(1, 0, 0)]);
    }

    #[test]
    fn empty_decorations_yield_no_tags() {
        assert!(parse_decorations("").is_empty());
        assert!(parse_decorations(" (HEAD -> main)").is_empty());
    }

    #[test]
    fn semver_tag_accepts_optional_v_prefix() {
        assert_eq!(parse_semver_tag("v1.0.0"), Some(Version::new(1, 0, 0)));
        assert_eq!(parse_semver_tag("1.0.0"), Some(Version::new(1, 0, 0)));
        assert!(parse_semver_tag("release-candidate").is_none());
        assert!(parse_semver_tag("v1.0").is_none());
    }

    #[test]
    fn semver_tag_accepts_prerelease_and_build() {
        assert!(parse_semver_tag("v1.0.0-alpha.1").is_some());
        assert!(parse_semver_tag("1.0.0+build.5").is_some());
    }

    #[test]
    fn parses_log_line_with_pipes_in_subject() {
        let line = format!(
            "abc123{sep}Alice{sep}2024-05-01{sep} (tag: v1.0.0){sep}feat: support a | b syntax",
            sep = FIELD_SEPARATOR
        );
        let commit = parse_log_line(&line).unwrap();
        assert_eq!(commit.hash, "abc123");
        assert_eq!(commit.author, "Alice");
        assert_eq!(commit.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(commit.subject, "feat: support a | b syntax");
        assert_eq!(commit.tags, vec![Version::new(1, 0, 0)]);
    }

    #[test]
    fn range_argument_forms() {
        let full = LogRange::default();
        assert_eq!(full.to_arg(), None);

        let from = LogRange {
            from: Some("v1.0.0".to_string()),
            to: None,
        };
        assert_eq!(from.to_arg().as_deref(), Some("v1.0.0..HEAD"));

        let both = LogRange {
            from: Some("v1.0.0".to_string()),
            to: Some("v2.0.0".to_string()),
        };
        assert_eq!(both.to_arg().as_deref(), Some("v1.0.0..v2.0.0"));

        let to = LogRange {
            from: None,
            to: Some("v2.0.0".to_string()),
        };
        assert_eq!(to.to_arg().as_deref(), Some("v2.0.0"));
    }
}
