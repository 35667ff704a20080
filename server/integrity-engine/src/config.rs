//! Audit configuration: scorer thresholds and per-organization windows.

use std::path::Path;

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::error::AuditError;

/// Tunable thresholds for the suspicion rules. Built once and handed to the
/// scorer; never mutated while scoring.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Rules {
  /// Minimum commit count for the burst rules (mass activity, rapid fire).
  pub burst_min_commits: usize,
  /// Minimum cumulative lines for mass activity.
  pub mass_activity_min_lines: u64,
  /// Maximum first-to-last span for mass activity, in seconds.
  pub mass_activity_max_span_secs: i64,
  /// points = base * min(cap, lines / line_unit), rounded.
  pub mass_activity_base_points: f64,
  pub mass_activity_line_unit: f64,
  pub mass_activity_multiplier_cap: f64,
  /// Total lines at which mass activity becomes high severity.
  pub mass_activity_high_lines: u64,
  /// A single commit touching more than this many lines is a mass commit.
  pub mass_commit_lines: u64,
  pub mass_commit_points: u32,
  /// The only commit in the window adding more than this is a single dump.
  pub single_commit_additions: u32,
  pub single_commit_points: u32,
  /// additions / deletions above this means nothing was ever corrected.
  pub no_corrections_ratio: f64,
  pub no_corrections_points: u32,
  /// Additions above this with zero deletions.
  pub only_additions_min: u64,
  pub only_additions_points: u32,
  pub rapid_fire_max_span_secs: i64,
  pub rapid_fire_points: u32,
  /// Lines per minute between consecutive commits.
  pub max_lines_per_minute: f64,
  pub unrealistic_speed_points: u32,
  pub generic_messages_points: u32,
  /// Share of generic messages (0..1) for the weaker generic-message flag.
  pub mostly_generic_ratio: f64,
  pub mostly_generic_points: u32,
  /// Messages (trimmed, lowercased) carrying no description.
  pub generic_messages: Vec<String>,
}

impl Default for Rules {
  fn default() -> Self {
    Self {
      burst_min_commits: 3,
      mass_activity_min_lines: 200,
      mass_activity_max_span_secs: 10 * 60,
      mass_activity_base_points: 50.0,
      mass_activity_line_unit: 300.0,
      mass_activity_multiplier_cap: 2.0,
      mass_activity_high_lines: 500,
      mass_commit_lines: 300,
      mass_commit_points: 20,
      single_commit_additions: 50,
      single_commit_points: 20,
      no_corrections_ratio: 20.0,
      no_corrections_points: 10,
      only_additions_min: 100,
      only_additions_points: 12,
      rapid_fire_max_span_secs: 120,
      rapid_fire_points: 15,
      max_lines_per_minute: 100.0,
      unrealistic_speed_points: 25,
      generic_messages_points: 8,
      mostly_generic_ratio: 0.7,
      mostly_generic_points: 5,
      generic_messages: ["update", "fix", "done", "asdf", "test", "commit", ".", "..", "..."]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    }
  }
}

/// Longest configurable burst span: one year.
const MAX_SPAN_SECS: i64 = 366 * 24 * 60 * 60;
/// Any single flag worth more than this already saturates the score.
const MAX_POINTS: u32 = 100;

impl Rules {
  /// Reject values that make no sense as thresholds.
  pub fn validate(&self) -> Result<(), AuditError> {
    for (field, secs) in [
      ("rules.mass_activity_max_span_secs", self.mass_activity_max_span_secs),
      ("rules.rapid_fire_max_span_secs", self.rapid_fire_max_span_secs),
    ] {
      if !(0..=MAX_SPAN_SECS).contains(&secs) {
        return Err(AuditError::invalid_input(field, "span must be between 0 and one year"));
      }
    }

    for (field, value) in [
      ("rules.mass_activity_base_points", self.mass_activity_base_points),
      ("rules.mass_activity_multiplier_cap", self.mass_activity_multiplier_cap),
      ("rules.no_corrections_ratio", self.no_corrections_ratio),
      ("rules.max_lines_per_minute", self.max_lines_per_minute),
      ("rules.mostly_generic_ratio", self.mostly_generic_ratio),
    ] {
      if !value.is_finite() || value < 0.0 {
        return Err(AuditError::invalid_input(field, "must be a finite, non-negative number"));
      }
    }
    if !self.mass_activity_line_unit.is_finite() || self.mass_activity_line_unit <= 0.0 {
      return Err(AuditError::invalid_input(
        "rules.mass_activity_line_unit",
        "must be a finite, positive number",
      ));
    }
    if self.mostly_generic_ratio > 1.0 {
      return Err(AuditError::invalid_input("rules.mostly_generic_ratio", "must be at most 1"));
    }
    if self.mass_activity_base_points * self.mass_activity_multiplier_cap > MAX_POINTS as f64 {
      return Err(AuditError::invalid_input(
        "rules.mass_activity_base_points",
        "base points times multiplier cap must be at most 100",
      ));
    }

    for (field, points) in [
      ("rules.mass_commit_points", self.mass_commit_points),
      ("rules.single_commit_points", self.single_commit_points),
      ("rules.no_corrections_points", self.no_corrections_points),
      ("rules.only_additions_points", self.only_additions_points),
      ("rules.rapid_fire_points", self.rapid_fire_points),
      ("rules.unrealistic_speed_points", self.unrealistic_speed_points),
      ("rules.generic_messages_points", self.generic_messages_points),
      ("rules.mostly_generic_points", self.mostly_generic_points),
    ] {
      if points > MAX_POINTS {
        return Err(AuditError::invalid_input(field, "points must be at most 100"));
      }
    }
    Ok(())
  }
}

/// Window bounds as written in the config file. Exactly one of the
/// day-name pair or the date pair must be set; see `WindowSpec::parse`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
  #[serde(default)]
  pub start_day: Option<String>,
  #[serde(default)]
  pub end_day: Option<String>,
  #[serde(default)]
  pub start_date: Option<String>,
  #[serde(default)]
  pub end_date: Option<String>,
  pub start_time: String,
  pub end_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationConfig {
  pub name: String,
  pub window: WindowConfig,
  #[serde(default)]
  pub ignore_authors: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
  pub organizations: Vec<OrganizationConfig>,
  /// Authors skipped in every organization (bots, instructors).
  #[serde(default)]
  pub ignore_authors: Vec<String>,
  /// Offset used for local-time window math, e.g. "+01:00". Absent means the
  /// caller supplies the host's offset.
  #[serde(default)]
  pub utc_offset: Option<String>,
  #[serde(default)]
  pub rules: Rules,
}

impl AuditConfig {
  pub fn from_json(raw: &str) -> Result<Self, AuditError> {
    let config: Self = serde_json::from_str(raw)?;
    config.rules.validate()?;
    Ok(config)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, AuditError> {
    let raw = std::fs::read_to_string(path)?;
    Self::from_json(&raw)
  }

  pub fn organization(&self, name: &str) -> Option<&OrganizationConfig> {
    self.organizations.iter().find(|o| o.name == name)
  }

  /// Global ignore list followed by the organization's own entries.
  pub fn ignore_list_for(&self, org: &OrganizationConfig) -> Vec<String> {
    self
      .ignore_authors
      .iter()
      .chain(org.ignore_authors.iter())
      .cloned()
      .collect()
  }

  /// Parsed `utc_offset`, if configured.
  pub fn offset(&self) -> Result<Option<FixedOffset>, AuditError> {
    match &self.utc_offset {
      Some(raw) => parse_utc_offset(raw).map(Some),
      None => Ok(None),
    }
  }
}

/// Parse "+HH:MM" / "-HH:MM" (or "Z") into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, AuditError> {
  let s = raw.trim();
  if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
    return Ok(Utc.fix());
  }
  s.parse::<FixedOffset>().map_err(|e| {
    AuditError::invalid_input("utc_offset", &format!("expected +HH:MM or -HH:MM, got {:?}: {}", raw, e))
  })
}
