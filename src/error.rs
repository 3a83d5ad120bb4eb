//! Error types for a hygiene run
//!
//! Errors are classified by who has to act:
//! - Operator: missing credential, bad configuration
//! - Provider: the API answered with an error response
//! - Environment: local I/O while writing the report

use std::path::PathBuf;
use thiserror::Error;

use crate::pagerduty::PagerDutyError;

/// Errors that end a hygiene run without a report
#[derive(Debug, Error)]
pub enum HygieneError {
    #[error("Environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {message}")]
    ConfigFile { path: PathBuf, message: String },

    #[error("PagerDuty: {0}")]
    PagerDuty(#[from] PagerDutyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HygieneError {
    /// Returns true if the operator has to change something before rerunning
    pub fn requires_user_action(&self) -> bool {
        match self {
            HygieneError::MissingCredential(_)
            | HygieneError::Config(_)
            | HygieneError::ConfigFile { .. } => true,
            HygieneError::PagerDuty(e) => matches!(e.status(), Some(401) | Some(403)),
            HygieneError::Io(_) => false,
        }
    }

    /// Process exit status: 2 when the operator must fix something first,
    /// 1 for provider or local failures.
    pub fn exit_code(&self) -> u8 {
        if self.requires_user_action() {
            2
        } else {
            1
        }
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            HygieneError::MissingCredential(_) => {
                "Export a PagerDuty REST API key as PD_API_KEY and run again."
            }
            HygieneError::Config(_) | HygieneError::ConfigFile { .. } => {
                "Check ~/.pd-hygiene/config.json and the PD_API_URL / PD_PAGE_LIMIT variables."
            }
            HygieneError::PagerDuty(e) => match e.status() {
                Some(401) => "The API key was rejected. Generate a new key and try again.",
                Some(403) => "The API key lacks read access to users or schedules.",
                Some(429) => "Rate limited by PagerDuty. Wait a minute and try again.",
                Some(s) if s >= 500 => "PagerDuty is having trouble. Try again later.",
                _ => "Check the API URL and your network connection.",
            },
            HygieneError::Io(_) => "Check that stdout is writable.",
        }
    }
}
