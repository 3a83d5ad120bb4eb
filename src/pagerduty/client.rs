//! reqwest client for the PagerDuty REST API v2.
//!
//! Token auth (`Authorization: Token token=...`) against the configured base
//! URL. Single attempt per request; no retry or backoff.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::Value;
use url::Url;

use super::{envelope_key, unwrap_envelope, Page, PagerDutyApi, PagerDutyError};
use crate::config::HygieneConfig;

const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";

pub struct PagerDutyClient {
    client: reqwest::Client,
    base_url: Url,
    page_limit: usize,
}

impl std::fmt::Debug for PagerDutyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Headers hold the key; keep them out of logs.
        f.debug_struct("PagerDutyClient")
            .field("base_url", &self.base_url.as_str())
            .field("page_limit", &self.page_limit)
            .finish_non_exhaustive()
    }
}

impl PagerDutyClient {
    pub fn new(api_key: &str, config: &HygieneConfig) -> Result<Self, PagerDutyError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token token={}", api_key))
            .map_err(|_| PagerDutyError::InvalidApiKey)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V2));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("pd-hygiene/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // Url::join drops the last segment unless the base ends with '/'.
        let mut base = config.api_url.trim_end_matches('/').to_string();
        base.push('/');

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            page_limit: config.page_limit,
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, PagerDutyError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// GET `path` with `params` and return the decoded JSON body.
    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<Value, PagerDutyError> {
        let url = self.url_for(path)?;
        log::debug!("GET {}", url);

        let resp = self.client.get(url).query(params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PagerDutyError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| PagerDutyError::Decode {
            status: status.as_u16(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PagerDutyApi for PagerDutyClient {
    async fn list_page(
        &self,
        resource: &str,
        params: &[(String, String)],
        offset: usize,
        limit: usize,
    ) -> Result<Page, PagerDutyError> {
        let mut query: Vec<(String, String)> = params.to_vec();
        query.push(("offset".to_string(), offset.to_string()));
        query.push(("limit".to_string(), limit.to_string()));

        let mut body = self.get_json(resource, &query).await?;
        let more = body.get("more").and_then(Value::as_bool).unwrap_or(false);
        let items = match unwrap_envelope(body.take(), envelope_key(resource))? {
            Value::Array(items) => items,
            other => {
                return Err(PagerDutyError::UnexpectedShape(format!(
                    "'{}' is not a list: {}",
                    resource, other
                )))
            }
        };

        Ok(Page { items, more })
    }

    async fn rget(&self, path: &str, params: &[(String, String)]) -> Result<Value, PagerDutyError> {
        let body = self.get_json(path, params).await?;
        unwrap_envelope(body, envelope_key(path))
    }

    fn page_limit(&self) -> usize {
        self.page_limit
    }
}

/// Prefer the provider's `error.message` (plus any detail lines) over the raw body.
fn api_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let Some(error) = parsed.as_ref().and_then(|v| v.get("error")) else {
        return body.to_string();
    };

    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let details: Vec<&str> = error
        .get("errors")
        .and_then(Value::as_array)
        .map(|errs| errs.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if details.is_empty() {
        message
    } else {
        format!("{} ({})", message, details.join("; "))
    }
}
