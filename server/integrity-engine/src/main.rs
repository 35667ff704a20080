//! Binary entrypoint: read audit requests as JSON lines from stdin, write
//! JSON lines to stdout.
//!
//! Usage: integrity-engine <config.json>
//!
//! Each input line is an AuditRequest (one repository's commits). Each output
//! line is either:
//! - A RepositoryAudit (window, excluded count, suspicion report)
//! - An ErrorOutput (when the line cannot be parsed or names an unknown org)
//!
//! Windows are resolved once at start-up. Logs go to stderr (RUST_LOG).

use std::io::{self, BufRead, Write};

use chrono::{Local, Utc};
use integrity_engine::types::ErrorOutput;
use integrity_engine::{AuditConfig, AuditError, AuditRequest, Auditor};
use tracing::{error, info};

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    )
    .with_writer(io::stderr)
    .init();

  let path = match std::env::args().nth(1) {
    Some(p) => p,
    None => {
      let _ = writeln!(io::stderr(), "usage: integrity-engine <config.json>");
      std::process::exit(2);
    }
  };

  if let Err(e) = run(&path) {
    error!("integrity-engine: {}", e);
    std::process::exit(1);
  }
}

fn run(path: &str) -> Result<(), AuditError> {
  let config = AuditConfig::load(path)?;
  // Window math runs in the configured offset, or the host's offset right now.
  let now = match config.offset()? {
    Some(offset) => Utc::now().with_timezone(&offset),
    None => Local::now().fixed_offset(),
  };
  let auditor = Auditor::new(config)?;
  let windows = auditor.resolve_all(&now)?;
  for (org, w) in &windows {
    info!(org = %org, since = %w.since, until = %w.until, "window resolved");
  }

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  for line in stdin.lock().lines() {
    let line = line?;

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let request: AuditRequest = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        write_line(&mut out, &ErrorOutput::new(format!("json parse: {}", e)));
        continue;
      }
    };

    let result = match windows.get(&request.organization) {
      Some(window) => auditor.audit(&request, *window),
      None => Err(AuditError::UnknownOrganization(request.organization.clone())),
    };

    match result {
      Ok(audit) => write_line(&mut out, &audit),
      Err(e) => {
        let err = match e.field() {
          Some(field) => ErrorOutput::new(e.to_string()).with_field(field),
          None => ErrorOutput::new(e.to_string()),
        };
        write_line(&mut out, &err);
      }
    }
  }

  out.flush()?;
  Ok(())
}

fn write_line<W: Write, T: serde::Serialize>(out: &mut W, value: &T) {
  let _ = serde_json::to_writer(&mut *out, value);
  let _ = writeln!(out);
}
