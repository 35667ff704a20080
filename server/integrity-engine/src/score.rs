//! Suspicion score (0-100) and the flags that explain it.
//!
//! Rules run in a fixed order and flags keep that order. The score is the sum
//! of all flag points, capped at 100.

use chrono::Duration;
use tracing::debug;

use crate::config::Rules;
use crate::types::{CommitRecord, FlagKind, Severity, SuspicionFlag, SuspicionReport};

/// Rule engine over one repository's commits. Holds only immutable rules, so
/// one scorer can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
  rules: Rules,
}

/// Aggregates computed once per scoring pass.
struct Tally<'a> {
  /// Ascending by timestamp; ties keep input order.
  commits: Vec<&'a CommitRecord>,
  additions: u64,
  deletions: u64,
  lines: u64,
  span: Duration,
}

impl<'a> Tally<'a> {
  fn new(commits: &'a [CommitRecord]) -> Self {
    let mut sorted: Vec<&CommitRecord> = commits.iter().collect();
    sorted.sort_by_key(|c| c.timestamp);
    let additions: u64 = sorted.iter().map(|c| c.additions as u64).sum();
    let deletions: u64 = sorted.iter().map(|c| c.deletions as u64).sum();
    let span = match (sorted.first(), sorted.last()) {
      (Some(first), Some(last)) => last.timestamp - first.timestamp,
      _ => Duration::zero(),
    };
    Self {
      commits: sorted,
      additions,
      deletions,
      lines: additions + deletions,
      span,
    }
  }

  fn count(&self) -> usize {
    self.commits.len()
  }
}

impl Scorer {
  pub fn new(rules: Rules) -> Self {
    Self { rules }
  }

  /// Score `commits` (already filtered to the window and to non-ignored
  /// authors). Never fails; empty input yields an empty report.
  pub fn score(&self, commits: &[CommitRecord], repo_label: &str) -> SuspicionReport {
    if commits.is_empty() {
      return SuspicionReport::empty(repo_label);
    }

    let tally = Tally::new(commits);
    let rules = &self.rules;
    let mut flags = Vec::new();

    let burst = mass_activity(&tally, rules);
    let had_mass_activity = burst.is_some();
    flags.extend(burst);
    flags.extend(mass_commits(&tally, rules));
    flags.extend(single_commit(&tally, rules));
    flags.extend(corrections(&tally, rules));
    if !had_mass_activity {
      flags.extend(rapid_fire(&tally, rules));
    }
    flags.extend(unrealistic_speed(&tally, rules));
    flags.extend(generic_messages(&tally, rules));

    for flag in &flags {
      debug!(
        repo = repo_label,
        flag = flag.kind.as_str(),
        points = flag.points,
        "{}",
        flag.message
      );
    }

    let total = flags.iter().fold(0u32, |acc, f| acc.saturating_add(f.points));
    SuspicionReport {
      repo_label: repo_label.to_string(),
      score: total.min(100) as u8,
      flags,
      commit_count: tally.count(),
      total_lines: tally.lines,
    }
  }
}

/// Score with the default rules.
pub fn score(commits: &[CommitRecord], repo_label: &str) -> SuspicionReport {
  Scorer::default().score(commits, repo_label)
}

/// Sort reports most suspicious first, then by label for a stable listing.
pub fn rank_reports(reports: &mut [SuspicionReport]) {
  reports.sort_by(|a, b| {
    b.score
      .cmp(&a.score)
      .then_with(|| a.repo_label.cmp(&b.repo_label))
  });
}

/// `span` longer than `limit_secs`, compared in milliseconds so no limit can overflow.
fn exceeds(span: Duration, limit_secs: i64) -> bool {
  span.num_milliseconds() > limit_secs.saturating_mul(1000)
}

fn flag(kind: FlagKind, severity: Severity, points: u32, message: String) -> SuspicionFlag {
  SuspicionFlag {
    kind,
    severity,
    message,
    points,
  }
}

fn mass_activity(t: &Tally, rules: &Rules) -> Option<SuspicionFlag> {
  if t.count() < rules.burst_min_commits
    || t.lines < rules.mass_activity_min_lines
    || exceeds(t.span, rules.mass_activity_max_span_secs)
  {
    return None;
  }
  let multiplier = (t.lines as f64 / rules.mass_activity_line_unit).min(rules.mass_activity_multiplier_cap);
  let points = (rules.mass_activity_base_points * multiplier).round() as u32;
  let severity = if t.lines >= rules.mass_activity_high_lines {
    Severity::High
  } else {
    Severity::Medium
  };
  Some(flag(
    FlagKind::MassActivity,
    severity,
    points,
    format!(
      "{} commits changing {} lines within {:.1} minutes",
      t.count(),
      t.lines,
      t.span.num_seconds() as f64 / 60.0
    ),
  ))
}

fn mass_commits(t: &Tally, rules: &Rules) -> Vec<SuspicionFlag> {
  t.commits
    .iter()
    .filter(|c| c.lines() > rules.mass_commit_lines)
    .map(|c| {
      flag(
        FlagKind::MassCommit,
        Severity::High,
        rules.mass_commit_points,
        format!("Commit {} changed {} lines at once", c.short_sha(), c.lines()),
      )
    })
    .collect()
}

fn single_commit(t: &Tally, rules: &Rules) -> Option<SuspicionFlag> {
  match t.commits.as_slice() {
    [only] if only.additions > rules.single_commit_additions => Some(flag(
      FlagKind::SingleCommit,
      Severity::High,
      rules.single_commit_points,
      format!("All work arrived in one commit ({} lines added)", only.additions),
    )),
    _ => None,
  }
}

/// NO_CORRECTIONS and ONLY_ADDITIONS; at most one of the two fires.
fn corrections(t: &Tally, rules: &Rules) -> Option<SuspicionFlag> {
  if t.deletions > 0 {
    let ratio = t.additions as f64 / t.deletions as f64;
    if ratio > rules.no_corrections_ratio {
      return Some(flag(
        FlagKind::NoCorrections,
        Severity::Low,
        rules.no_corrections_points,
        format!(
          "Almost nothing removed: {} additions vs {} deletions ({:.0}:1)",
          t.additions, t.deletions, ratio
        ),
      ));
    }
    None
  } else if t.additions > rules.only_additions_min {
    Some(flag(
      FlagKind::OnlyAdditions,
      Severity::Low,
      rules.only_additions_points,
      format!("{} lines added and none deleted", t.additions),
    ))
  } else {
    None
  }
}

fn rapid_fire(t: &Tally, rules: &Rules) -> Option<SuspicionFlag> {
  if t.count() < rules.burst_min_commits || exceeds(t.span, rules.rapid_fire_max_span_secs) {
    return None;
  }
  Some(flag(
    FlagKind::RapidFire,
    Severity::Medium,
    rules.rapid_fire_points,
    format!("{} commits within {} seconds", t.count(), t.span.num_seconds()),
  ))
}

/// First consecutive pair whose later commit outpaces the typing limit.
/// A zero gap with any lines counts as infinitely fast.
fn unrealistic_speed(t: &Tally, rules: &Rules) -> Option<SuspicionFlag> {
  t.commits.windows(2).find_map(|pair| {
    let (prev, next) = (pair[0], pair[1]);
    let minutes = (next.timestamp - prev.timestamp).num_milliseconds() as f64 / 60_000.0;
    let lines = next.lines() as f64;
    let rate = if minutes > 0.0 {
      lines / minutes
    } else if lines > 0.0 {
      f64::INFINITY
    } else {
      0.0
    };
    if rate <= rules.max_lines_per_minute {
      return None;
    }
    let message = if rate.is_finite() {
      format!(
        "Commit {} added {} lines {:.1} minutes after the previous one ({:.0} lines/min)",
        next.short_sha(),
        next.lines(),
        minutes,
        rate
      )
    } else {
      format!(
        "Commit {} added {} lines with no time since the previous one",
        next.short_sha(),
        next.lines()
      )
    };
    Some(flag(
      FlagKind::UnrealisticSpeed,
      Severity::High,
      rules.unrealistic_speed_points,
      message,
    ))
  })
}

fn is_generic(message: &str, rules: &Rules) -> bool {
  let m = message.trim().to_lowercase();
  m.is_empty() || rules.generic_messages.iter().any(|g| *g == m)
}

/// GENERIC_MESSAGES when every message is filler, MOSTLY_GENERIC past the ratio.
fn generic_messages(t: &Tally, rules: &Rules) -> Option<SuspicionFlag> {
  let generic = t.commits.iter().filter(|c| is_generic(&c.message, rules)).count();
  let total = t.count();
  if generic == total {
    Some(flag(
      FlagKind::GenericMessages,
      Severity::Low,
      rules.generic_messages_points,
      format!("All {} commit messages are generic", total),
    ))
  } else if generic as f64 / total as f64 >= rules.mostly_generic_ratio {
    Some(flag(
      FlagKind::MostlyGeneric,
      Severity::Low,
      rules.mostly_generic_points,
      format!("{} of {} commit messages are generic", generic, total),
    ))
  } else {
    None
  }
}
