//! window-preview: show which time window each organization will be audited in
//!
//! Usage:
//!   window-preview <config.json>                      # windows as of now
//!   window-preview <config.json> --at 2026-02-18T12:00:00+01:00
//!   window-preview <config.json> -j                   # JSON lines
//!
//! Handy before a grading run to confirm the recurring windows land on the
//! intended week.

use std::env;
use std::process;

use chrono::{DateTime, FixedOffset, Local, Utc};
use integrity_engine::{AuditConfig, Auditor, ResolvedWindow};

#[derive(serde::Serialize)]
struct WindowLine<'a> {
    organization: &'a str,
    since: DateTime<FixedOffset>,
    until: DateTime<FixedOffset>,
    hours: f64,
}

fn load(path: &str) -> (AuditConfig, Option<FixedOffset>) {
    let config = AuditConfig::load(path).unwrap_or_else(|e| {
        eprintln!("window-preview: cannot load {}: {}", path, e);
        process::exit(2);
    });
    let offset = config.offset().unwrap_or_else(|e| {
        eprintln!("window-preview: {}", e);
        process::exit(2);
    });
    (config, offset)
}

fn reference_instant(at: Option<&String>, offset: Option<FixedOffset>) -> DateTime<FixedOffset> {
    match (at, offset) {
        (Some(raw), offset) => {
            let parsed = DateTime::parse_from_rfc3339(raw).unwrap_or_else(|e| {
                eprintln!("window-preview: --at must be RFC3339: {}", e);
                process::exit(2);
            });
            match offset {
                Some(o) => parsed.with_timezone(&o),
                None => parsed,
            }
        }
        (None, Some(o)) => Utc::now().with_timezone(&o),
        (None, None) => Local::now().fixed_offset(),
    }
}

fn describe(w: &ResolvedWindow, tz: &FixedOffset) -> (DateTime<FixedOffset>, DateTime<FixedOffset>, f64) {
    let hours = (w.until - w.since).num_minutes() as f64 / 60.0;
    (w.since.with_timezone(tz), w.until.with_timezone(tz), hours)
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let json = args.iter().any(|a| a == "-j" || a == "--json");
    let at = args
        .iter()
        .position(|a| a == "--at")
        .and_then(|i| args.get(i + 1));
    let files: Vec<_> = args
        .iter()
        .skip(1)
        .filter(|a| !a.starts_with('-') && Some(*a) != at)
        .collect();

    if files.len() != 1 {
        eprintln!("Usage: window-preview <config.json> [--at <RFC3339>] [-j|--json]");
        eprintln!("  --at  Reference instant (default: now)");
        eprintln!("  -j    JSON lines output");
        process::exit(2);
    }

    let (config, offset) = load(files[0]);
    let now = reference_instant(at, offset);
    let tz = now.timezone();

    let auditor = Auditor::new(config).unwrap_or_else(|e| {
        eprintln!("window-preview: {}", e);
        process::exit(2);
    });
    let windows = auditor.resolve_all(&now).unwrap_or_else(|e| {
        eprintln!("window-preview: {}", e);
        process::exit(1);
    });

    for (org, w) in &windows {
        let (since, until, hours) = describe(w, &tz);
        if json {
            let line = WindowLine {
                organization: org,
                since,
                until,
                hours,
            };
            match serde_json::to_string(&line) {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    eprintln!("window-preview: {}", e);
                    process::exit(1);
                }
            }
        } else {
            println!(
                "{}: {} -> {} ({:.1}h)",
                org,
                since.format("%a %Y-%m-%d %H:%M"),
                until.format("%a %Y-%m-%d %H:%M"),
                hours
            );
        }
    }
}
