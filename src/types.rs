//! Domain types shared between the collectors and the report.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A licensed PagerDuty user, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    /// Team display names, in the order the API lists them.
    pub teams: Vec<String>,
    /// Taken verbatim from the API. `true` means an invite went out; whether
    /// it was accepted is not known here.
    pub invitation_sent: bool,
}

/// User id to licensed user, in the order the API listed them.
pub type UserMap = IndexMap<String, User>;

/// User id to display name, across every schedule. A user seen on a later
/// schedule keeps its first position and takes the later name.
pub type ScheduleMembership = IndexMap<String, String>;
