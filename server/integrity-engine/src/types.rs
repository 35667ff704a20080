//! Core types for the integrity engine (JSON contracts + internal models).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the fetch layer sends)
// ---------------------------------------------------------------------------

/// One commit as delivered by the VCS fetch layer. Stats are optional because
/// merge commits often come back without per-file diff data.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommit {
  pub sha: String,
  #[serde(default, alias = "author")]
  pub author_name: Option<String>,
  pub timestamp: String,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub additions: Option<u32>,
  #[serde(default)]
  pub deletions: Option<u32>,
}

/// One inbound request line: all commits of one repository, unfiltered.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditRequest {
  pub organization: String,
  pub repository: String,
  #[serde(default)]
  pub commits: Vec<RawCommit>,
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// Canonical commit consumed by the scorer. Never carries absent stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
  pub sha: String,
  pub author_name: String,
  pub timestamp: DateTime<Utc>,
  pub message: String,
  pub additions: u32,
  pub deletions: u32,
}

impl CommitRecord {
  /// Lines touched by this commit.
  pub fn lines(&self) -> u64 {
    self.additions as u64 + self.deletions as u64
  }

  /// Abbreviated sha for flag messages.
  pub fn short_sha(&self) -> &str {
    let end = self
      .sha
      .char_indices()
      .nth(7)
      .map(|(i, _)| i)
      .unwrap_or(self.sha.len());
    &self.sha[..end]
  }
}

/// Absolute bounds of one window occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedWindow {
  pub since: DateTime<Utc>,
  pub until: DateTime<Utc>,
}

impl ResolvedWindow {
  /// Inclusive on both ends, matching the host API's since/until filter.
  pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
    *ts >= self.since && *ts <= self.until
  }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Low,
  Medium,
  High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagKind {
  MassActivity,
  MassCommit,
  SingleCommit,
  NoCorrections,
  OnlyAdditions,
  RapidFire,
  UnrealisticSpeed,
  GenericMessages,
  MostlyGeneric,
}

impl FlagKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::MassActivity => "MASS_ACTIVITY",
      Self::MassCommit => "MASS_COMMIT",
      Self::SingleCommit => "SINGLE_COMMIT",
      Self::NoCorrections => "NO_CORRECTIONS",
      Self::OnlyAdditions => "ONLY_ADDITIONS",
      Self::RapidFire => "RAPID_FIRE",
      Self::UnrealisticSpeed => "UNREALISTIC_SPEED",
      Self::GenericMessages => "GENERIC_MESSAGES",
      Self::MostlyGeneric => "MOSTLY_GENERIC",
    }
  }
}

/// One piece of evidence produced by a scoring pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspicionFlag {
  #[serde(rename = "type")]
  pub kind: FlagKind,
  pub severity: Severity,
  pub message: String,
  pub points: u32,
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspicionReport {
  pub repo_label: String,
  pub score: u8,
  pub flags: Vec<SuspicionFlag>,
  pub commit_count: usize,
  pub total_lines: u64,
}

impl SuspicionReport {
  pub fn empty(repo_label: impl Into<String>) -> Self {
    Self {
      repo_label: repo_label.into(),
      score: 0,
      flags: Vec::new(),
      commit_count: 0,
      total_lines: 0,
    }
  }

  pub fn has_flag(&self, kind: FlagKind) -> bool {
    self.flags.iter().any(|f| f.kind == kind)
  }
}

/// One output line: a repository's report plus the window it was scored in.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryAudit {
  pub organization: String,
  pub window: ResolvedWindow,
  /// Commits dropped before scoring (outside the window, ignored author, bad timestamp).
  pub excluded_commits: usize,
  pub report: SuspicionReport,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
