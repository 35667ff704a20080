//! Resolve window specifications into absolute [since, until] bounds.
//!
//! A recurring window ("Monday 09:00 to Friday 17:00") resolves to its most
//! recent occurrence whose end is not in the future. A date window resolves
//! verbatim. All calendar math happens in the timezone carried by `now`:
//! day shifts are calendar-day shifts, ambiguous local times take the earlier
//! instant, and local times skipped by a DST gap move forward to the first
//! time that exists.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use tracing::debug;

use crate::config::WindowConfig;
use crate::error::AuditError;
use crate::types::ResolvedWindow;

/// Upper bound on how far a non-existent local time is pushed forward.
const MAX_GAP_MINUTES: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSpec {
  /// Repeats every week, anchored to day names.
  Recurring {
    start_day: Weekday,
    start_time: NaiveTime,
    end_day: Weekday,
    end_time: NaiveTime,
  },
  /// One-off window anchored to calendar dates.
  Dates {
    start_date: NaiveDate,
    start_time: NaiveTime,
    end_date: NaiveDate,
    end_time: NaiveTime,
  },
}

impl WindowSpec {
  /// Validate the configured bounds and build the matching variant.
  ///
  /// Mixing a day name with a calendar date is a configuration error, never
  /// coerced into either shape.
  pub fn parse(cfg: &WindowConfig) -> Result<Self, AuditError> {
    let start_day = non_empty(&cfg.start_day);
    let end_day = non_empty(&cfg.end_day);
    let start_date = non_empty(&cfg.start_date);
    let end_date = non_empty(&cfg.end_date);

    let has_day = start_day.is_some() || end_day.is_some();
    let has_date = start_date.is_some() || end_date.is_some();

    if has_day && has_date {
      return Err(AuditError::configuration(
        "window",
        "cannot mix day names (startDay/endDay) with calendar dates (startDate/endDate)",
      ));
    }

    let start_time = parse_time(&cfg.start_time, "startTime")?;
    let end_time = parse_time(&cfg.end_time, "endTime")?;

    match (start_day, end_day, start_date, end_date) {
      (Some(sd), Some(ed), None, None) => Ok(Self::Recurring {
        start_day: parse_day(sd, "startDay")?,
        start_time,
        end_day: parse_day(ed, "endDay")?,
        end_time,
      }),
      (None, None, Some(sd), Some(ed)) => Ok(Self::Dates {
        start_date: parse_date(sd, "startDate")?,
        start_time,
        end_date: parse_date(ed, "endDate")?,
        end_time,
      }),
      (None, None, None, None) => Err(AuditError::configuration(
        "window",
        "expected startDay/endDay or startDate/endDate",
      )),
      _ => Err(AuditError::configuration(
        "window",
        "both start and end bounds must be given",
      )),
    }
  }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
  v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Case-insensitive day name ("Monday", "monday", "MON").
pub fn parse_day(raw: &str, field: &str) -> Result<Weekday, AuditError> {
  raw
    .trim()
    .parse::<Weekday>()
    .map_err(|_| AuditError::invalid_input(field, &format!("unknown day name {:?}", raw)))
}

/// 24-hour "HH:MM".
pub fn parse_time(raw: &str, field: &str) -> Result<NaiveTime, AuditError> {
  NaiveTime::parse_from_str(raw.trim(), "%H:%M")
    .map_err(|e| AuditError::invalid_input(field, &format!("expected HH:MM, got {:?}: {}", raw, e)))
}

/// "YYYY-MM-DD".
pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AuditError> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
    .map_err(|e| AuditError::invalid_input(field, &format!("expected YYYY-MM-DD, got {:?}: {}", raw, e)))
}

/// Resolve `spec` against `now`, in `now`'s timezone.
///
/// Date windows are passed through even when `until < since`; ordering is the
/// caller's concern for one-off windows.
pub fn resolve_window<Tz: TimeZone>(
  spec: &WindowSpec,
  now: &DateTime<Tz>,
) -> Result<ResolvedWindow, AuditError> {
  let tz = now.timezone();
  let window = match *spec {
    WindowSpec::Dates {
      start_date,
      start_time,
      end_date,
      end_time,
    } => ResolvedWindow {
      since: to_instant(&tz, start_date.and_time(start_time), "startTime")?,
      until: to_instant(&tz, end_date.and_time(end_time), "endTime")?,
    },
    WindowSpec::Recurring {
      start_day,
      start_time,
      end_day,
      end_time,
    } => {
      let now_utc = now.with_timezone(&Utc);
      let end_num = end_day.num_days_from_sunday() as i64;
      let start_num = start_day.num_days_from_sunday() as i64;

      let days_back = (now.weekday().num_days_from_sunday() as i64 - end_num).rem_euclid(7);
      let mut end_date = now.date_naive() - Duration::days(days_back);
      let mut until = to_instant(&tz, end_date.and_time(end_time), "endTime")?;
      // Today is the end day but the end time has not come yet.
      if until > now_utc {
        end_date = end_date - Duration::days(7);
        until = to_instant(&tz, end_date.and_time(end_time), "endTime")?;
      }

      let mut day_diff = (end_num - start_num).rem_euclid(7);
      if day_diff == 0 && end_time < start_time {
        day_diff = 7;
      }
      let start_date = end_date - Duration::days(day_diff);
      let since = to_instant(&tz, start_date.and_time(start_time), "startTime")?;

      ResolvedWindow { since, until }
    }
  };

  debug!(since = %window.since, until = %window.until, "resolved window");
  Ok(window)
}

/// Map a local wall-clock time to an instant: earliest on ambiguity, first
/// existing minute after a gap.
fn to_instant<Tz: TimeZone>(
  tz: &Tz,
  local: NaiveDateTime,
  field: &str,
) -> Result<DateTime<Utc>, AuditError> {
  let mut candidate = local;
  for _ in 0..=MAX_GAP_MINUTES {
    if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
      return Ok(dt.with_timezone(&Utc));
    }
    candidate = candidate + Duration::minutes(1);
  }
  Err(AuditError::invalid_input(
    field,
    &format!("local time {} does not exist in this timezone", local),
  ))
}
