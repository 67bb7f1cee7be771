use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RecordId;

/// Outcome tier of a scored submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateStatus {
    Shortlisted,
    OnHold,
    Rejected,
}

impl CandidateStatus {
    pub fn label(self) -> &'static str {
        match self {
            CandidateStatus::Shortlisted => "SHORTLISTED",
            CandidateStatus::OnHold => "ON_HOLD",
            CandidateStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAnalysis {
    pub score: u8,
    pub details: String,
    /// Job description as it read when the resume was scored.
    pub job_description: String,
}

/// Assignment submission merged onto a candidate by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_file: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status: CandidateStatus,
    pub analysis: super::ReviewAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_file_name: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub status: CandidateStatus,
    /// Absent for candidates first seen through an assignment review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<CandidateAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_submission: Option<PrSubmission>,
}

impl Candidate {
    /// Email match used for merging reviews onto candidates. Addresses are
    /// compared after trimming and ASCII case folding.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}
