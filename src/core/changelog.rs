//! Changelog generation in Keep a Changelog format.
//!
//! Commits are walked newest first. Each semver-tagged commit starts a
//! release section (the tagged commit belongs to its release); commits
//! newer than the newest tag form the `Unreleased` section, omitted
//! when empty. Subjects matching no Conventional Commits type land in
//! an explicit Uncategorized bucket rather than being dropped; the one
//! exception is merge commits, which are excluded outright.
//!
//! The rendered document contains nothing that is not derived from
//! history, so re-running on unchanged history is byte-identical.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use semver::Version;
use serde::Serialize;

use crate::core::error::Result;
use crate::core::git::{self, CommitRecord, LogRange};
use crate::utils::io;

pub const DEFAULT_OUTPUT_FILE: &str = "CHANGELOG.md";

/// Keep a Changelog categories, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
    Uncategorized,
}

impl Category {
    pub const ORDERED: [Category; 7] = [
        Category::Added,
        Category::Changed,
        Category::Deprecated,
        Category::Removed,
        Category::Fixed,
        Category::Security,
        Category::Uncategorized,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            Category::Added => "Added",
            Category::Changed => "Changed",
            Category::Deprecated => "Deprecated",
            Category::Removed => "Removed",
            Category::Fixed => "Fixed",
            Category::Security => "Security",
            Category::Uncategorized => "Uncategorized",
        }
    }

    /// Map a Conventional Commits type to its category.
    pub fn from_commit_type(commit_type: &str) -> Option<Category> {
        match commit_type {
            "feat" => Some(Category::Added),
            "fix" => Some(Category::Fixed),
            "docs" | "style" | "refactor" | "perf" | "test" | "build" | "ci" | "chore" => {
                Some(Category::Changed)
            }
            "revert" => Some(Category::Removed),
            "deprecate" => Some(Category::Deprecated),
            "security" => Some(Category::Security),
            _ => None,
        }
    }
}

// type(scope)?!?: description
fn subject_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([a-z]+)(?:\([^)]*\))?!?:\s+(.+)$").expect("invalid commit subject pattern")
    })
}

/// Detect merge commits, which never appear in the changelog.
pub fn is_merge_commit(subject: &str) -> bool {
    let lower = subject.to_lowercase();
    lower.starts_with("merge pull request")
        || lower.starts_with("merge branch")
        || lower.starts_with("merge remote-tracking")
}

/// Categorize a subject and produce its bullet text.
///
/// Recognized subjects keep only the description (prefix stripped);
/// uncategorized subjects keep the raw text.
pub fn categorize(subject: &str) -> (Category, String) {
    if let Some(caps) = subject_pattern().captures(subject) {
        if let Some(category) = Category::from_commit_type(&caps[1]) {
            return (category, caps[2].to_string());
        }
    }
    (Category::Uncategorized, subject.to_string())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub category: Category,
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// `None` for the Unreleased section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub sections: Vec<Section>,
}

/// Group commits (newest first) into releases by semver tag.
pub fn group_releases(commits: &[CommitRecord]) -> Vec<Release> {
    let mut releases = Vec::new();
    let mut version: Option<String> = None;
    let mut date: Option<NaiveDate> = None;
    let mut bucket: Vec<(Category, String)> = Vec::new();

    for commit in commits {
        if let Some(tagged) = highest_version(&commit.tags) {
            push_release(
                &mut releases,
                version.take(),
                date.take(),
                std::mem::take(&mut bucket),
            );
            version = Some(tagged.to_string());
            date = Some(commit.date);
        }
        if is_merge_commit(&commit.subject) {
            continue;
        }
        bucket.push(categorize(&commit.subject));
    }
    push_release(&mut releases, version, date, bucket);

    releases
}

/// A commit carrying several semver tags is headed by the highest.
fn highest_version(tags: &[Version]) -> Option<&Version> {
    tags.iter().max()
}

fn push_release(
    releases: &mut Vec<Release>,
    version: Option<String>,
    date: Option<NaiveDate>,
    bucket: Vec<(Category, String)>,
) {
    // An empty Unreleased section is omitted entirely
    if version.is_none() && bucket.is_empty() {
        return;
    }
    releases.push(Release {
        version,
        date,
        sections: build_sections(&bucket),
    });
}

fn build_sections(bucket: &[(Category, String)]) -> Vec<Section> {
    Category::ORDERED
        .iter()
        .filter_map(|&category| {
            let entries: Vec<String> = bucket
                .iter()
                .filter(|(c, _)| *c == category)
                .map(|(_, message)| message.clone())
                .collect();
            if entries.is_empty() {
                None
            } else {
                Some(Section { category, entries })
            }
        })
        .collect()
}

/// Render releases as a Keep a Changelog document.
pub fn render(releases: &[Release]) -> String {
    let mut out = String::from("# Changelog\n");
    for release in releases {
        out.push('\n');
        match (&release.version, release.date) {
            (Some(version), Some(date)) => {
                out.push_str(&format!("## [{}] - {}\n", version, date.format("%Y-%m-%d")));
            }
            _ => out.push_str("## [Unreleased]\n"),
        }
        for section in &release.sections {
            out.push_str(&format!("\n### {}\n\n", section.category.heading()));
            for entry in &section.entries {
                out.push_str(&format!("- {}\n", entry));
            }
        }
    }
    out
}

/// Read the range's history and group it into releases.
pub fn collect(dir: &Path, range: &LogRange) -> Result<Vec<Release>> {
    let commits = git::log_commits(dir, range)?;
    Ok(group_releases(&commits))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogOutput {
    pub path: PathBuf,
    pub releases: usize,
    pub changed: bool,
}

/// Write the rendered document to `path` (atomic: temp + rename).
///
/// When the existing file already matches, it is left untouched and
/// the output reports `changed: false`.
pub fn write(path: &Path, releases: &[Release]) -> Result<ChangelogOutput> {
    let rendered = render(releases);

    if let Ok(existing) = std::fs::read_to_string(path) {
        if existing == rendered {
            return Ok(ChangelogOutput {
                path: path.to_path_buf(),
                releases: releases.len(),
                changed: false,
            });
        }
    }

    io::write_file_atomic(path, &rendered)?;
    Ok(ChangelogOutput {
        path: path.to_path_buf(),
        releases: releases.len(),
        changed: true,
    })
}
