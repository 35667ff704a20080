//! Property tests for window resolution.

use chrono::{Duration, TimeZone, Utc};
use integrity_engine::{resolve_window, WindowConfig, WindowSpec};
use proptest::prelude::*;

const DAYS: [&str; 7] = ["sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];

fn recurring(sd: usize, sh: u32, ed: usize, eh: u32) -> WindowSpec {
  WindowSpec::parse(&WindowConfig {
    start_day: Some(DAYS[sd].into()),
    end_day: Some(DAYS[ed].into()),
    start_time: format!("{:02}:00", sh),
    end_time: format!("{:02}:30", eh),
    ..WindowConfig::default()
  })
  .unwrap()
}

proptest! {
  #[test]
  fn recurring_window_is_ordered_and_not_in_future(
    sd in 0usize..7, sh in 0u32..24, ed in 0usize..7, eh in 0u32..24,
    offset_mins in 0i64..(60 * 24 * 400),
  ) {
    let spec = recurring(sd, sh, ed, eh);
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(offset_mins);
    let w = resolve_window(&spec, &now).unwrap();
    prop_assert!(w.since <= w.until);
    prop_assert!(w.until <= now);
    prop_assert!(now - w.until < Duration::days(7));
    prop_assert!(w.until - w.since <= Duration::days(7));
  }

  #[test]
  fn resolution_is_idempotent(
    sd in 0usize..7, sh in 0u32..24, ed in 0usize..7, eh in 0u32..24,
    offset_mins in 0i64..(60 * 24 * 400),
  ) {
    let spec = recurring(sd, sh, ed, eh);
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(offset_mins);
    prop_assert_eq!(resolve_window(&spec, &now).unwrap(), resolve_window(&spec, &now).unwrap());
  }
}
