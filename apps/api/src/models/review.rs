use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CandidateStatus, RecordId};
use crate::screening::RoleTrack;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAnalysis {
    pub score: u8,
    pub details: String,
}

/// One scored assignment submission. The review log is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub track: RoleTrack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub status: CandidateStatus,
    pub submitted_at: DateTime<Utc>,
    pub analysis: ReviewAnalysis,
}
