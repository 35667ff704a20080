//! Structured error types for window resolution and audit configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
  /// The window shape itself is wrong (mixed day-name/date bounds, missing bounds).
  #[error("configuration: {field}: {reason}")]
  Configuration { field: String, reason: String },

  /// A single value could not be understood (day name, time of day, date).
  #[error("invalid input: {field}: {reason}")]
  InvalidInput { field: String, reason: String },

  #[error("unknown organization: {0}")]
  UnknownOrganization(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl AuditError {
  pub fn configuration(field: &str, reason: &str) -> Self {
    Self::Configuration {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn invalid_input(field: &str, reason: &str) -> Self {
    Self::InvalidInput {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  /// Field name for the structured error line, when the error carries one.
  pub fn field(&self) -> Option<&str> {
    match self {
      Self::Configuration { field, .. } | Self::InvalidInput { field, .. } => Some(field.as_str()),
      _ => None,
    }
  }
}
