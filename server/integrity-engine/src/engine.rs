//! Audit orchestration: resolve each organization's window, filter a
//! repository's commits into it, and score them.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeZone};
use tracing::{info, warn};

use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::normalize;
use crate::score::Scorer;
use crate::types::*;
use crate::window::{self, WindowSpec};

struct Organization {
  window: WindowSpec,
  ignore: Vec<String>,
}

/// Stateless between calls: every audit reads only its request and the
/// configuration fixed at construction.
pub struct Auditor {
  scorer: Scorer,
  organizations: HashMap<String, Organization>,
}

impl Auditor {
  /// Validate every organization's window up front so a bad config fails
  /// before any repository is audited.
  pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
    config.rules.validate()?;
    let mut organizations = HashMap::new();
    for org in &config.organizations {
      let window = WindowSpec::parse(&org.window).map_err(|e| match e {
        AuditError::Configuration { field, reason } => AuditError::Configuration {
          field: format!("{}.{}", org.name, field),
          reason,
        },
        AuditError::InvalidInput { field, reason } => AuditError::InvalidInput {
          field: format!("{}.{}", org.name, field),
          reason,
        },
        other => other,
      })?;
      organizations.insert(
        org.name.clone(),
        Organization {
          window,
          ignore: config.ignore_list_for(org),
        },
      );
    }
    Ok(Self {
      scorer: Scorer::new(config.rules),
      organizations,
    })
  }

  /// Most recent completed window for `organization`.
  pub fn resolve<Tz: TimeZone>(
    &self,
    organization: &str,
    now: &DateTime<Tz>,
  ) -> Result<ResolvedWindow, AuditError> {
    let org = self
      .organizations
      .get(organization)
      .ok_or_else(|| AuditError::UnknownOrganization(organization.to_string()))?;
    window::resolve_window(&org.window, now)
  }

  /// Resolve every organization once, keyed by name.
  pub fn resolve_all<Tz: TimeZone>(
    &self,
    now: &DateTime<Tz>,
  ) -> Result<BTreeMap<String, ResolvedWindow>, AuditError> {
    self
      .organizations
      .iter()
      .map(|(name, org)| Ok((name.clone(), window::resolve_window(&org.window, now)?)))
      .collect()
  }

  /// Audit one repository inside an already resolved window.
  ///
  /// Commits with unparseable timestamps are dropped (and logged) rather than
  /// failing the whole repository.
  pub fn audit(
    &self,
    request: &AuditRequest,
    window: ResolvedWindow,
  ) -> Result<RepositoryAudit, AuditError> {
    let org = self
      .organizations
      .get(&request.organization)
      .ok_or_else(|| AuditError::UnknownOrganization(request.organization.clone()))?;

    let commits: Vec<CommitRecord> = request
      .commits
      .iter()
      .filter_map(|raw| match normalize::normalize_commit(raw) {
        Ok(c) => Some(c),
        Err(e) => {
          warn!(repo = %request.repository, sha = %raw.sha, "skipping commit: {}", e);
          None
        }
      })
      .collect();

    let selected = normalize::select_commits(commits, &window, &org.ignore);
    let excluded_commits = request.commits.len() - selected.len();
    let report = self.scorer.score(&selected, &request.repository);

    info!(
      org = %request.organization,
      repo = %request.repository,
      score = report.score,
      commits = report.commit_count,
      excluded = excluded_commits,
      "audited repository"
    );

    Ok(RepositoryAudit {
      organization: request.organization.clone(),
      window,
      excluded_commits,
      report,
    })
  }

  /// Resolve the organization's window against `now`, then audit.
  pub fn audit_at<Tz: TimeZone>(
    &self,
    request: &AuditRequest,
    now: &DateTime<Tz>,
  ) -> Result<RepositoryAudit, AuditError> {
    let window = self.resolve(&request.organization, now)?;
    self.audit(request, window)
  }
}
