//! Native PagerDuty REST API v2 client
//!
//! Read-only access to the three resources the hygiene report needs:
//! schedules, users on a schedule, and users. Collectors talk to the
//! [`PagerDutyApi`] trait so they can run against a fake in tests.
//!
//! Modules:
//! - client: reqwest-backed implementation of [`PagerDutyApi`]
//! - pagination: lazy offset/limit/more iterator over list endpoints
//! - models: wire types for the resources we read

pub mod client;
pub mod models;
pub mod pagination;

use async_trait::async_trait;
use serde_json::Value;

pub use client::PagerDutyClient;
pub use pagination::Paginator;

/// Default REST API base URL (US service region).
pub const DEFAULT_API_URL: &str = "https://api.pagerduty.com";

/// Largest page size PagerDuty accepts for classic pagination.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Query parameters as owned pairs, in the order they are sent.
pub type Params = Vec<(String, String)>;

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PagerDutyError {
    /// The request never produced a response: connect failure, timeout,
    /// connection reset.
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("could not decode response ({status}): {message}")]
    Decode { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey,
}

impl PagerDutyError {
    /// True when the provider answered. A response-bearing error aborts the
    /// run; one without a response only truncates the current collection.
    pub fn has_response(&self) -> bool {
        match self {
            PagerDutyError::Network(e) => e.status().is_some(),
            PagerDutyError::Api { .. }
            | PagerDutyError::Decode { .. }
            | PagerDutyError::UnexpectedShape(_) => true,
            // Nothing was sent: a setup problem, not a blip.
            PagerDutyError::InvalidUrl(_) | PagerDutyError::InvalidApiKey => true,
        }
    }

    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            PagerDutyError::Network(e) => e.status().map(|s| s.as_u16()),
            PagerDutyError::Api { status, .. } | PagerDutyError::Decode { status, .. } => {
                Some(*status)
            }
            PagerDutyError::UnexpectedShape(_)
            | PagerDutyError::InvalidUrl(_)
            | PagerDutyError::InvalidApiKey => None,
        }
    }
}

// ============================================================================
// Transport seam
// ============================================================================

/// One page of a classic-paginated list endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    /// Whether the provider reports more records after this page.
    pub more: bool,
}

/// Authenticated, read-only access to the PagerDuty REST API.
#[async_trait]
pub trait PagerDutyApi: Send + Sync {
    /// Fetch one page of `resource` (e.g. `"users"`), starting at `offset`.
    async fn list_page(
        &self,
        resource: &str,
        params: &[(String, String)],
        offset: usize,
        limit: usize,
    ) -> Result<Page, PagerDutyError>;

    /// GET an arbitrary path and unwrap the envelope named after its last
    /// segment: `/schedules/P1/users` yields the `users` value.
    async fn rget(&self, path: &str, params: &[(String, String)]) -> Result<Value, PagerDutyError>;

    /// Page size used by [`Paginator`].
    fn page_limit(&self) -> usize {
        MAX_PAGE_LIMIT
    }
}

/// Envelope key for a path: the last non-empty segment, ignoring any query.
pub(crate) fn envelope_key(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or(path);
    path.trim_end_matches('/')
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

/// Pull `key` out of a response body, the way every v2 endpoint wraps results.
pub(crate) fn unwrap_envelope(mut body: Value, key: &str) -> Result<Value, PagerDutyError> {
    match body.get_mut(key) {
        Some(v) => Ok(v.take()),
        None => Err(PagerDutyError::UnexpectedShape(format!(
            "missing '{}' in response",
            key
        ))),
    }
}
