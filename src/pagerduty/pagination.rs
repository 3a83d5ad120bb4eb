//! Lazy iteration over classic-paginated list endpoints.
//!
//! PagerDuty list endpoints take `offset` and `limit` and answer with a
//! `more` flag. [`Paginator`] buffers one page at a time and only asks for
//! the next page once the buffer is drained and the provider reported `more`.

use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{PagerDutyApi, PagerDutyError, Params};

pub struct Paginator<'a> {
    api: &'a dyn PagerDutyApi,
    resource: String,
    params: Params,
    offset: usize,
    buffer: VecDeque<Value>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<'a> Paginator<'a> {
    pub fn new(api: &'a dyn PagerDutyApi, resource: &str, params: Params) -> Self {
        Self {
            api,
            resource: resource.to_string(),
            params,
            offset: 0,
            buffer: VecDeque::new(),
            exhausted: false,
            pages_fetched: 0,
        }
    }

    /// Next raw item, fetching a new page when needed. `None` once the
    /// listing is exhausted. After an error the paginator is exhausted.
    pub async fn next(&mut self) -> Option<Result<Value, PagerDutyError>> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page().await {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }

    /// Next item decoded as `T`.
    pub async fn next_as<T: DeserializeOwned>(&mut self) -> Option<Result<T, PagerDutyError>> {
        match self.next().await? {
            Ok(value) => Some(decode_item(value)),
            Err(e) => Some(Err(e)),
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    async fn fetch_page(&mut self) -> Result<(), PagerDutyError> {
        let limit = self.api.page_limit();
        let page = self
            .api
            .list_page(&self.resource, &self.params, self.offset, limit)
            .await?;
        self.pages_fetched += 1;

        log::debug!(
            "Fetched {} page {} ({} items, offset {}, more={})",
            self.resource,
            self.pages_fetched,
            page.items.len(),
            self.offset,
            page.more
        );

        // An empty page with more=true would otherwise loop forever.
        if !page.more || page.items.is_empty() {
            self.exhausted = true;
        }
        self.offset += page.items.len();
        self.buffer.extend(page.items);
        Ok(())
    }
}

/// Decode one list item. The item came from a successful response, so a
/// mismatch is reported as a response-bearing decode error.
pub(crate) fn decode_item<T: DeserializeOwned>(value: Value) -> Result<T, PagerDutyError> {
    serde_json::from_value(value).map_err(|e| PagerDutyError::Decode {
        status: 200,
        message: e.to_string(),
    })
}
