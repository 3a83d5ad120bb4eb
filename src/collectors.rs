//! Collectors for schedules, schedule membership and users.
//!
//! Each collector walks its endpoint once. An error with no HTTP response
//! ends the walk early: whatever was gathered is returned together with a
//! [`CollectionWarning`]. An error carrying a response is returned as `Err`.

use chrono::NaiveDate;
use serde_json::Value;

use crate::pagerduty::models::{ApiSchedule, ApiScheduleUser, ApiUser};
use crate::pagerduty::pagination::decode_item;
use crate::pagerduty::{PagerDutyApi, PagerDutyError, Paginator};
use crate::types::{ScheduleMembership, User, UserMap};

/// Why a collection stopped before the provider ran out of data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionWarning {
    /// Which collector degraded, e.g. `"schedules"`.
    pub source: &'static str,
    pub message: String,
}

/// Items from one collector, possibly partial.
#[derive(Debug, Clone, PartialEq)]
pub struct Collected<T> {
    pub items: T,
    pub warning: Option<CollectionWarning>,
}

impl<T> Collected<T> {
    fn complete(items: T) -> Self {
        Self {
            items,
            warning: None,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.warning.is_some()
    }
}

/// Keep partial data on a response-less error; propagate anything else.
fn degrade<T>(
    source: &'static str,
    items: T,
    err: PagerDutyError,
) -> Result<Collected<T>, PagerDutyError> {
    if err.has_response() {
        return Err(err);
    }
    log::warn!(
        "Network error while collecting {}, continuing with partial data: {}",
        source,
        err
    );
    Ok(Collected {
        items,
        warning: Some(CollectionWarning {
            source,
            message: err.to_string(),
        }),
    })
}

/// Ids of every schedule listed in `time_zone`, in fetch order.
pub async fn list_schedule_ids(
    api: &dyn PagerDutyApi,
    time_zone: &str,
) -> Result<Collected<Vec<String>>, PagerDutyError> {
    let params = vec![("time_zone".to_string(), time_zone.to_string())];
    let mut pages = Paginator::new(api, "schedules", params);
    let mut ids = Vec::new();

    while let Some(item) = pages.next_as::<ApiSchedule>().await {
        match item {
            Ok(schedule) => ids.push(schedule.id),
            Err(e) => return degrade("schedules", ids, e),
        }
    }

    log::info!("Found {} schedules", ids.len());
    Ok(Collected::complete(ids))
}

/// Users on any of `schedule_ids` from `since` onwards, keyed by user id.
pub async fn list_members(
    api: &dyn PagerDutyApi,
    schedule_ids: &[String],
    since: NaiveDate,
) -> Result<Collected<ScheduleMembership>, PagerDutyError> {
    let params = vec![("since".to_string(), since.format("%Y-%m-%d").to_string())];
    let mut members = ScheduleMembership::new();

    for id in schedule_ids {
        let path = format!("/schedules/{}/users", id);
        let users = match api.rget(&path, &params).await.and_then(schedule_users) {
            Ok(users) => users,
            Err(e) => return degrade("schedule members", members, e),
        };
        log::debug!("Schedule {} has {} users", id, users.len());
        for user in users {
            members.insert(user.id, user.summary);
        }
    }

    log::info!(
        "Found {} distinct users across {} schedules",
        members.len(),
        schedule_ids.len()
    );
    Ok(Collected::complete(members))
}

fn schedule_users(value: Value) -> Result<Vec<ApiScheduleUser>, PagerDutyError> {
    decode_item(value)
}

/// Every licensed user, keyed by user id.
pub async fn list_users(api: &dyn PagerDutyApi) -> Result<Collected<UserMap>, PagerDutyError> {
    let mut pages = Paginator::new(api, "users", Vec::new());
    let mut users = UserMap::new();

    while let Some(item) = pages.next_as::<ApiUser>().await {
        match item {
            Ok(user) => {
                users.insert(
                    user.id,
                    User {
                        name: user.summary,
                        teams: user.teams.into_iter().map(|t| t.summary).collect(),
                        invitation_sent: user.invitation_sent,
                    },
                );
            }
            Err(e) => return degrade("users", users, e),
        }
    }

    log::info!("Found {} users", users.len());
    Ok(Collected::complete(users))
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::pagerduty::{envelope_key, Page, PagerDutyApi, PagerDutyError};

    /// Injected failure for one request.
    pub enum Reply {
        Offline,
        Status(u16),
    }

    /// In-memory PagerDuty: list resources are served in pages of `limit`,
    /// paths answer with a canned reply. `failures` injects an error at a
    /// given (resource, offset) or path.
    pub struct FakePagerDuty {
        pub lists: HashMap<String, Vec<Value>>,
        pub paths: HashMap<String, Value>,
        pub failures: HashMap<String, Reply>,
        pub limit: usize,
        pub requests: Mutex<Vec<String>>,
    }

    impl FakePagerDuty {
        pub fn new(limit: usize) -> Self {
            Self {
                lists: HashMap::new(),
                paths: HashMap::new(),
                failures: HashMap::new(),
                limit,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_list(mut self, resource: &str, items: Vec<Value>) -> Self {
            self.lists.insert(resource.to_string(), items);
            self
        }

        pub fn with_path(mut self, path: &str, items: Value) -> Self {
            self.paths.insert(path.to_string(), items);
            self
        }

        pub fn failing(mut self, key: &str, reply: Reply) -> Self {
            self.failures.insert(key.to_string(), reply);
            self
        }

        fn failure(&self, key: &str) -> Option<PagerDutyError> {
            match self.failures.get(key)? {
                Reply::Offline => Some(offline()),
                Reply::Status(status) => Some(PagerDutyError::Api {
                    status: *status,
                    message: "injected".to_string(),
                }),
            }
        }
    }

    /// A response-less error. reqwest reports an unbuildable request the
    /// same way as a refused connection: no status attached.
    pub fn offline() -> PagerDutyError {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .expect_err("invalid URL must not build");
        PagerDutyError::Network(err)
    }

    #[async_trait]
    impl PagerDutyApi for FakePagerDuty {
        async fn list_page(
            &self,
            resource: &str,
            _params: &[(String, String)],
            offset: usize,
            limit: usize,
        ) -> Result<Page, PagerDutyError> {
            let key = format!("{}@{}", resource, offset);
            self.requests.lock().unwrap().push(key.clone());
            if let Some(err) = self.failure(&key) {
                return Err(err);
            }
            let all = self.lists.get(resource).cloned().unwrap_or_default();
            let end = (offset + limit).min(all.len());
            let items = all.get(offset..end).map(<[Value]>::to_vec).unwrap_or_default();
            Ok(Page {
                items,
                more: end < all.len(),
            })
        }

        async fn rget(
            &self,
            path: &str,
            _params: &[(String, String)],
        ) -> Result<Value, PagerDutyError> {
            self.requests.lock().unwrap().push(path.to_string());
            if let Some(err) = self.failure(path) {
                return Err(err);
            }
            self.paths
                .get(path)
                .cloned()
                .ok_or_else(|| PagerDutyError::Api {
                    status: 404,
                    message: format!("no {} at {}", envelope_key(path), path),
                })
        }

        fn page_limit(&self) -> usize {
            self.limit
        }
    }
}
