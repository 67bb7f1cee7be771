use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{number_or_string, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequisitionStatus {
    Open,
}

/// An open job posting. Written once at intake; never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requisition {
    pub id: RecordId,
    pub role: String,
    #[serde(deserialize_with = "number_or_string")]
    pub years_of_experience: u32,
    pub job_description: String,
    pub created_at: DateTime<Utc>,
    pub status: RequisitionStatus,
}

impl Requisition {
    /// Locates the requisition for a role. Roles are exact, case-sensitive keys;
    /// when several requisitions share a role the first one stored wins.
    pub fn find_by_role<'a>(requisitions: &'a [Requisition], role: &str) -> Option<&'a Requisition> {
        requisitions.iter().find(|r| r.role == role)
    }
}
