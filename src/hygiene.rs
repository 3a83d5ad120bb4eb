//! Licence and schedule hygiene (reconcile + report).
//!
//! Compares who is on call against who holds a licence and prints three
//! lists: scheduled users whose record was deleted, licensed users on no
//! schedule, and users with an outstanding invitation.

use std::io::{self, Write};

use serde::Serialize;

use crate::types::{ScheduleMembership, UserMap};

/// A user that still appears on a schedule but no longer has a licence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledGhost {
    pub id: String,
    /// Display name as the schedule reports it.
    pub name: String,
}

/// A licensed user listed in a report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedUser {
    pub id: String,
    pub name: String,
    pub teams: Vec<String>,
}

/// Result of reconciling schedule membership against licensed users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HygieneReport {
    pub deleted_but_scheduled: Vec<ScheduledGhost>,
    pub unscheduled: Vec<ReportedUser>,
    pub invitation_pending: Vec<ReportedUser>,
    pub licensed_users: usize,
    pub users_on_schedules: usize,
}

impl HygieneReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted_but_scheduled.len()
    }

    pub fn unscheduled_count(&self) -> usize {
        self.unscheduled.len()
    }

    pub fn pending_count(&self) -> usize {
        self.invitation_pending.len()
    }
}

/// Build the report. Lists follow the maps' fetch order.
pub fn reconcile(users_on_schedules: &ScheduleMembership, all_users: &UserMap) -> HygieneReport {
    let deleted_but_scheduled = users_on_schedules
        .iter()
        .filter(|(id, _)| !all_users.contains_key(*id))
        .map(|(id, name)| ScheduledGhost {
            id: id.clone(),
            name: name.clone(),
        })
        .collect();

    let reported = |(id, user): (&String, &crate::types::User)| ReportedUser {
        id: id.clone(),
        name: user.name.clone(),
        teams: user.teams.clone(),
    };

    let unscheduled = all_users
        .iter()
        .filter(|(id, _)| !users_on_schedules.contains_key(*id))
        .map(reported)
        .collect();

    // Literal flag check: an invite was sent. Acceptance is a separate field
    // that the user listing does not return, so "not accepted" is inferred.
    let invitation_pending = all_users
        .iter()
        .filter(|(_, user)| user.invitation_sent)
        .map(reported)
        .collect();

    HygieneReport {
        deleted_but_scheduled,
        unscheduled,
        invitation_pending,
        licensed_users: all_users.len(),
        users_on_schedules: users_on_schedules.len(),
    }
}

/// Print the report as plain text sections.
pub fn write_report<W: Write>(report: &HygieneReport, out: &mut W) -> io::Result<()> {
    section_title(
        out,
        "The following users have been deleted but are still on a schedule",
    )?;
    for ghost in &report.deleted_but_scheduled {
        writeln!(
            out,
            "User {} is on a schedule but does not have a licence",
            ghost.name
        )?;
    }
    writeln!(out)?;

    section_title(out, "The following users are not on any schedules")?;
    for user in &report.unscheduled {
        writeln!(out, "{} {}", user.name, format_teams(&user.teams))?;
    }
    writeln!(out)?;

    section_title(out, "The following users have not accepted their invitations")?;
    for user in &report.invitation_pending {
        writeln!(out, "{} {}", user.name, format_teams(&user.teams))?;
    }
    writeln!(out)?;

    section_title(out, "Some stats")?;
    writeln!(out, "Found {} licenced users in PagerDuty", report.licensed_users)?;
    writeln!(out, "Found {} users on schedules", report.users_on_schedules)?;
    writeln!(
        out,
        "Found {} users not on any schedules",
        report.unscheduled_count()
    )?;
    writeln!(
        out,
        "Found {} deleted users who need to be removed from a schedule",
        report.deleted_count()
    )?;
    writeln!(
        out,
        "Found {} users who have not accepted their invites",
        report.pending_count()
    )?;
    Ok(())
}

fn section_title<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

/// `['Ops', 'SRE']`, or `[]` for a user without teams.
fn format_teams(teams: &[String]) -> String {
    let quoted: Vec<String> = teams.iter().map(|t| format!("'{}'", t)).collect();
    format!("[{}]", quoted.join(", "))
}
