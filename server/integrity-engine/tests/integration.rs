//! Integration tests for the integrity engine.

use chrono::{DateTime, Duration, TimeZone, Utc};
use integrity_engine::types::FlagKind;
use integrity_engine::{
  resolve_window, AuditConfig, AuditError, AuditRequest, Auditor, WindowConfig, WindowSpec,
};

fn fixture_config() -> AuditConfig {
  let json = r#"{
    "ignore_authors": ["github-classroom[bot]"],
    "utc_offset": "+00:00",
    "organizations": [
      {
        "name": "cs101-spring",
        "window": {"startDay": "monday", "startTime": "09:00", "endDay": "FRIDAY", "endTime": "17:00"}
      }
    ]
  }"#;
  AuditConfig::from_json(json).unwrap()
}

fn fixture_request() -> AuditRequest {
  // 2026-02-10 is the Tuesday of the window that closes Friday 2026-02-13.
  let json = r#"{
    "organization": "cs101-spring",
    "repository": "team-7",
    "commits": [
      {"sha": "1111111aaaa", "author_name": "sam", "timestamp": "2026-02-10T14:00:00Z", "message": "upload", "additions": 600, "deletions": 30},
      {"sha": "2222222bbbb", "author_name": "sam", "timestamp": "2026-02-10T14:02:00Z", "message": "fix", "additions": 400, "deletions": 25},
      {"sha": "3333333cccc", "author_name": "sam", "timestamp": "2026-02-10T14:05:00Z", "message": "done", "additions": 130, "deletions": 20},
      {"sha": "4444444dddd", "author_name": "github-classroom[bot]", "timestamp": "2026-02-09T09:30:00Z", "message": "Initial commit", "additions": 2000},
      {"sha": "5555555eeee", "author": "sam", "timestamp": "2026-02-10T14:06:00Z", "message": "Merge branch 'main'"}
    ]
  }"#;
  serde_json::from_str(json).unwrap()
}

fn now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap()
}

#[test]
fn suspicious_burst_is_flagged_end_to_end() {
  let auditor = Auditor::new(fixture_config()).unwrap();
  let audit = auditor.audit_at(&fixture_request(), &now()).unwrap();

  assert_eq!(audit.organization, "cs101-spring");
  assert_eq!(audit.excluded_commits, 1);
  assert_eq!(audit.report.commit_count, 4);
  assert_eq!(audit.report.total_lines, 1205);
  assert!(audit.report.score > 50);
  assert_eq!(audit.report.flags[0].kind, FlagKind::MassActivity);
  assert!(audit.report.score <= 100);
}

#[test]
fn merge_commit_without_stats_counts_as_zero_lines() {
  let auditor = Auditor::new(fixture_config()).unwrap();
  let mut request = fixture_request();
  request.commits.truncate(3);
  let without_merge = auditor.audit_at(&request, &now()).unwrap();
  let with_merge = auditor.audit_at(&fixture_request(), &now()).unwrap();
  assert_eq!(without_merge.report.total_lines, with_merge.report.total_lines);
}

#[test]
fn output_json_shape() {
  let auditor = Auditor::new(fixture_config()).unwrap();
  let audit = auditor.audit_at(&fixture_request(), &now()).unwrap();
  let value = serde_json::to_value(&audit).unwrap();

  assert_eq!(value["window"]["since"], "2026-02-09T09:00:00Z");
  assert_eq!(value["window"]["until"], "2026-02-13T17:00:00Z");
  assert_eq!(value["report"]["repo_label"], "team-7");
  assert_eq!(value["report"]["flags"][0]["type"], "MASS_ACTIVITY");
  assert_eq!(value["report"]["flags"][0]["severity"], "high");
}

#[test]
fn deterministic_output_across_runs() {
  let a = Auditor::new(fixture_config()).unwrap();
  let b = Auditor::new(fixture_config()).unwrap();
  let json1 = serde_json::to_string(&a.audit_at(&fixture_request(), &now()).unwrap()).unwrap();
  let json2 = serde_json::to_string(&b.audit_at(&fixture_request(), &now()).unwrap()).unwrap();
  assert_eq!(json1, json2, "Same inputs must produce identical JSON output");
}

#[test]
fn empty_repository_scores_zero() {
  let auditor = Auditor::new(fixture_config()).unwrap();
  let request: AuditRequest =
    serde_json::from_str(r#"{"organization": "cs101-spring", "repository": "idle"}"#).unwrap();
  let audit = auditor.audit_at(&request, &now()).unwrap();
  assert_eq!(audit.report.score, 0);
  assert!(audit.report.flags.is_empty());
  assert_eq!(audit.report.commit_count, 0);
  assert_eq!(audit.report.total_lines, 0);
}

#[test]
fn mixed_window_config_gives_clear_error() {
  let cfg = WindowConfig {
    start_day: Some("Monday".into()),
    start_time: "10:00".into(),
    end_date: Some("2026-02-20".into()),
    end_time: "17:00".into(),
    ..WindowConfig::default()
  };
  let err = WindowSpec::parse(&cfg).unwrap_err();
  assert!(matches!(err, AuditError::Configuration { .. }));
  assert!(err.to_string().contains("window"), "Error should mention the field: {}", err);
}

#[test]
fn weekly_window_spanning_whole_week() {
  let cfg = WindowConfig {
    start_day: Some("Monday".into()),
    start_time: "11:00".into(),
    end_day: Some("Monday".into()),
    end_time: "09:00".into(),
    ..WindowConfig::default()
  };
  let spec = WindowSpec::parse(&cfg).unwrap();
  // Every hour across a week of reference instants.
  for hour in 0..(24 * 7) {
    let w = resolve_window(&spec, &(now() + Duration::hours(hour))).unwrap();
    let span = w.until - w.since;
    assert!(span > Duration::days(6) && span <= Duration::days(8));
    assert!(w.until <= now() + Duration::hours(hour));
  }
}
