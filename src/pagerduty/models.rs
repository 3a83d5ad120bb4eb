//! Wire types for the PagerDuty resources read by the hygiene report.
//!
//! Only the fields we use are modelled; serde ignores the rest.

use serde::{Deserialize, Serialize};

/// Reference object (`{id, type, summary, self, html_url}`) embedded in
/// other resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub id: String,
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSchedule {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

/// A user as returned inside a schedule's `users` list.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiScheduleUser {
    pub id: String,
    pub summary: String,
}

/// A user as returned by `GET /users`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: String,
    /// Required: a user without a display name is a malformed record.
    pub summary: String,
    #[serde(default)]
    pub teams: Vec<Reference>,
    #[serde(default)]
    pub invitation_sent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialization() {
        let json = r#"{
            "id": "PXPGF42",
            "type": "user",
            "summary": "Earline Greenholt",
            "name": "Earline Greenholt",
            "email": "125.greenholt.earline@graham.name",
            "time_zone": "America/Lima",
            "role": "admin",
            "invitation_sent": true,
            "teams": [
                {"id": "PQ9K7I8", "type": "team_reference", "summary": "Engineering"},
                {"id": "PQ9K7I9", "type": "team_reference", "summary": "Ops"}
            ]
        }"#;

        let user: ApiUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "PXPGF42");
        assert_eq!(user.summary, "Earline Greenholt");
        assert!(user.invitation_sent);
        let teams: Vec<&str> = user.teams.iter().map(|t| t.summary.as_str()).collect();
        assert_eq!(teams, vec!["Engineering", "Ops"]);
    }

    #[test]
    fn test_user_missing_optional_fields() {
        let json = r#"{"id": "P1", "summary": "No Teams"}"#;
        let user: ApiUser = serde_json::from_str(json).unwrap();
        assert!(user.teams.is_empty());
        assert!(!user.invitation_sent);
    }

    #[test]
    fn test_user_without_summary_rejected() {
        let json = r#"{"id": "P1", "teams": [], "invitation_sent": false}"#;
        assert!(serde_json::from_str::<ApiUser>(json).is_err());

        let json = r#"{"id": "P1", "summary": "Bob", "teams": [{"id": "T1"}]}"#;
        assert!(serde_json::from_str::<ApiUser>(json).is_err());

        let json = r#"{"id": "P1"}"#;
        assert!(serde_json::from_str::<ApiScheduleUser>(json).is_err());
    }

    #[test]
    fn test_schedule_deserialization() {
        let json = r#"{"id": "PI7DH85", "type": "schedule", "summary": "Daily Engineering Rotation", "time_zone": "UTC"}"#;
        let schedule: ApiSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.id, "PI7DH85");
        assert_eq!(schedule.time_zone.as_deref(), Some("UTC"));
    }
}
