pub mod collectors;
pub mod config;
pub mod error;
pub mod hygiene;
pub mod pagerduty;
pub mod types;

use chrono::NaiveDate;

use collectors::{list_members, list_schedule_ids, list_users, CollectionWarning};
use config::HygieneConfig;
use hygiene::HygieneReport;
use pagerduty::{PagerDutyApi, PagerDutyError};

/// Report plus any collection that came back partial.
#[derive(Debug, Clone)]
pub struct HygieneRun {
    pub report: HygieneReport,
    pub warnings: Vec<CollectionWarning>,
}

/// Collect schedules, schedule members and users in that order, then
/// reconcile. A response-bearing error from any collector aborts the run.
pub async fn run_hygiene(
    api: &dyn PagerDutyApi,
    config: &HygieneConfig,
    today: NaiveDate,
) -> Result<HygieneRun, PagerDutyError> {
    let mut warnings = Vec::new();

    let schedules = list_schedule_ids(api, &config.schedule_time_zone).await?;
    warnings.extend(schedules.warning);

    let members = list_members(api, &schedules.items, today).await?;
    warnings.extend(members.warning);

    let users = list_users(api).await?;
    warnings.extend(users.warning);

    let report = hygiene::reconcile(&members.items, &users.items);
    log::info!(
        "Hygiene scan complete: {} deleted-but-scheduled, {} unscheduled, {} pending invitations",
        report.deleted_count(),
        report.unscheduled_count(),
        report.pending_count()
    );

    Ok(HygieneRun { report, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::fake::{FakePagerDuty, Reply};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn account() -> FakePagerDuty {
        FakePagerDuty::new(100)
            .with_list("schedules", vec![json!({"id": "S1"})])
            .with_path(
                "/schedules/S1/users",
                json!([{"id": "u1", "summary": "Alice"}, {"id": "u3", "summary": "Ghost"}]),
            )
            .with_list(
                "users",
                vec![
                    json!({"id": "u1", "summary": "Alice", "teams": [], "invitation_sent": false}),
                    json!({"id": "u2", "summary": "Bob", "teams": [], "invitation_sent": true}),
                ],
            )
    }

    #[tokio::test]
    async fn test_full_run() {
        let api = account();
        let run = run_hygiene(&api, &HygieneConfig::default(), today())
            .await
            .unwrap();

        assert!(run.warnings.is_empty());
        assert_eq!(run.report.deleted_but_scheduled[0].name, "Ghost");
        assert_eq!(run.report.unscheduled[0].name, "Bob");
        assert_eq!(run.report.invitation_pending[0].name, "Bob");
        assert_eq!(run.report.licensed_users, 2);
        assert_eq!(run.report.users_on_schedules, 2);
        assert_eq!(
            *api.requests.lock().unwrap(),
            vec!["schedules@0", "/schedules/S1/users", "users@0"]
        );
    }

    #[tokio::test]
    async fn test_schedule_response_error_aborts_run() {
        let api = account().failing("schedules@0", Reply::Status(401));
        let err = run_hygiene(&api, &HygieneConfig::default(), today())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        // Nothing after the failed listing is fetched.
        assert_eq!(*api.requests.lock().unwrap(), vec!["schedules@0"]);
    }

    #[tokio::test]
    async fn test_degraded_run_still_reports() {
        let api = account().failing("/schedules/S1/users", Reply::Offline);
        let run = run_hygiene(&api, &HygieneConfig::default(), today())
            .await
            .unwrap();

        assert_eq!(run.warnings.len(), 1);
        assert_eq!(run.warnings[0].source, "schedule members");
        assert_eq!(run.report.users_on_schedules, 0);
        assert_eq!(run.report.unscheduled_count(), 2);
    }
}
