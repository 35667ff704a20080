//! Normalize inbound commits into canonical CommitRecords and filter them.

use chrono::{DateTime, Utc};

use crate::error::AuditError;
use crate::types::{CommitRecord, RawCommit, ResolvedWindow};

/// Parse and normalize a RawCommit. Absent stats count as zero and an absent
/// message as empty; only a malformed timestamp is an error.
pub fn normalize_commit(raw: &RawCommit) -> Result<CommitRecord, AuditError> {
  let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(raw.timestamp.trim())
    .map_err(|e| AuditError::invalid_input("timestamp", &format!("invalid RFC3339: {}", e)))?
    .with_timezone(&Utc);

  Ok(CommitRecord {
    sha: raw.sha.clone(),
    author_name: raw.author_name.clone().unwrap_or_default(),
    timestamp,
    message: raw.message.clone().unwrap_or_default(),
    additions: raw.additions.unwrap_or(0),
    deletions: raw.deletions.unwrap_or(0),
  })
}

/// Case-insensitive exact match against the ignore list.
pub fn is_ignored(author: &str, ignore: &[String]) -> bool {
  let author = author.trim().to_lowercase();
  ignore.iter().any(|name| name.trim().to_lowercase() == author)
}

/// Keep commits inside `window` whose author is not ignored.
pub fn select_commits(
  commits: Vec<CommitRecord>,
  window: &ResolvedWindow,
  ignore: &[String],
) -> Vec<CommitRecord> {
  commits
    .into_iter()
    .filter(|c| window.contains(&c.timestamp))
    .filter(|c| !is_ignored(&c.author_name, ignore))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn raw(sha: &str, ts: &str) -> RawCommit {
    RawCommit {
      sha: sha.into(),
      author_name: Some("Ada".into()),
      timestamp: ts.into(),
      message: None,
      additions: None,
      deletions: None,
    }
  }

  #[test]
  fn missing_stats_default_to_zero() {
    let c = normalize_commit(&raw("abc", "2026-02-16T10:00:00+01:00")).unwrap();
    assert_eq!(c.additions, 0);
    assert_eq!(c.deletions, 0);
    assert_eq!(c.message, "");
    assert_eq!(c.timestamp, Utc.with_ymd_and_hms(2026, 2, 16, 9, 0, 0).unwrap());
  }

  #[test]
  fn bad_timestamp_is_rejected() {
    let err = normalize_commit(&raw("abc", "yesterday")).unwrap_err();
    assert!(err.to_string().contains("timestamp"));
  }

  #[test]
  fn ignore_match_is_case_insensitive_and_exact() {
    let ignore = vec!["GitHub-Classroom[bot]".to_string()];
    assert!(is_ignored("github-classroom[bot]", &ignore));
    assert!(!is_ignored("github-classroom", &ignore));
  }

  #[test]
  fn select_drops_outside_window_and_ignored() {
    let window = ResolvedWindow {
      since: Utc.with_ymd_and_hms(2026, 2, 16, 9, 0, 0).unwrap(),
      until: Utc.with_ymd_and_hms(2026, 2, 20, 17, 0, 0).unwrap(),
    };
    let mut bot = normalize_commit(&raw("b", "2026-02-17T10:00:00Z")).unwrap();
    bot.author_name = "bot".into();
    let commits = vec![
      normalize_commit(&raw("in", "2026-02-17T10:00:00Z")).unwrap(),
      normalize_commit(&raw("early", "2026-02-16T08:59:59Z")).unwrap(),
      normalize_commit(&raw("edge", "2026-02-20T17:00:00Z")).unwrap(),
      bot,
    ];
    let kept = select_commits(commits, &window, &["BOT".to_string()]);
    let shas: Vec<&str> = kept.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(shas, vec!["in", "edge"]);
  }
}
