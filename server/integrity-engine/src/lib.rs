//! PushLog Commit Integrity Engine — deterministic, rule-based.
//!
//! Resolves audit windows (recurring weekly or fixed dates), filters each
//! repository's commits into the window, and scores them for patterns that do
//! not look like incremental work: bulk pastes, impossible typing speed, no
//! self-correction, filler commit messages.
//!
//! No DB, no network; pure computation. Fetching commits is the caller's job.

pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod score;
pub mod types;
pub mod window;

pub use config::{AuditConfig, Rules, WindowConfig};
pub use engine::Auditor;
pub use error::AuditError;
pub use score::{rank_reports, score, Scorer};
pub use types::{AuditRequest, CommitRecord, RepositoryAudit, ResolvedWindow, SuspicionReport};
pub use window::{resolve_window, WindowSpec};
