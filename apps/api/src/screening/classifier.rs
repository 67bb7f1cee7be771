//! Maps a 0–100 score onto SHORTLISTED / ON_HOLD / REJECTED and picks the
//! matching candidate email. Pure and total: every `u8` lands in exactly one tier.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::CandidateStatus;

/// Tier thresholds plus the application-path override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreeningPolicy {
    /// Scores at or above this are shortlisted.
    pub min_shortlist_score: u8,
    /// Scores at or above this (and below the shortlist bar) are put on hold.
    pub min_hold_score: u8,
    /// Shortlists every resume application regardless of score.
    /// Off by default; review submissions are never affected.
    pub force_shortlist_override: bool,
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self {
            min_shortlist_score: 40,
            min_hold_score: 20,
            force_shortlist_override: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("threshold {name}={value} exceeds 100")]
    OutOfRange { name: &'static str, value: u8 },

    #[error("min_hold_score ({hold}) must not exceed min_shortlist_score ({shortlist})")]
    Inverted { hold: u8, shortlist: u8 },
}

impl ScreeningPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.min_shortlist_score > 100 {
            return Err(PolicyError::OutOfRange {
                name: "min_shortlist_score",
                value: self.min_shortlist_score,
            });
        }
        if self.min_hold_score > 100 {
            return Err(PolicyError::OutOfRange {
                name: "min_hold_score",
                value: self.min_hold_score,
            });
        }
        if self.min_hold_score > self.min_shortlist_score {
            return Err(PolicyError::Inverted {
                hold: self.min_hold_score,
                shortlist: self.min_shortlist_score,
            });
        }
        Ok(())
    }

    pub fn tier_for(&self, score: u8) -> CandidateStatus {
        if score >= self.min_shortlist_score {
            CandidateStatus::Shortlisted
        } else if score >= self.min_hold_score {
            CandidateStatus::OnHold
        } else {
            CandidateStatus::Rejected
        }
    }
}

/// Subject lines for the three candidate emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplates {
    pub shortlisted_subject: String,
    pub on_hold_subject: String,
    pub rejected_subject: String,
}

impl Default for EmailTemplates {
    fn default() -> Self {
        Self {
            shortlisted_subject: "Next Round: Technical Assignment".to_string(),
            on_hold_subject: "Application Under Review".to_string(),
            rejected_subject: "Application Status Update".to_string(),
        }
    }
}

/// Candidate email body to render for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    NextRound,
    UnderReview,
    NotMovingForward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: CandidateStatus,
    pub email_subject: String,
    pub template: TemplateId,
    /// Shortlisted candidates receive the track's assignment document.
    pub attach_assignment: bool,
    /// True when the tier came from the override rather than the score.
    pub forced: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    policy: ScreeningPolicy,
    templates: EmailTemplates,
}

impl Classifier {
    pub fn new(policy: ScreeningPolicy, templates: EmailTemplates) -> Self {
        Self { policy, templates }
    }

    /// Score-only classification.
    pub fn classify(&self, score: u8) -> Classification {
        self.build(self.policy.tier_for(score), false)
    }

    /// Classification for the resume-application path, where
    /// `force_shortlist_override` may replace the score-derived tier.
    pub fn classify_application(&self, score: u8) -> Classification {
        let scored = self.policy.tier_for(score);
        if self.policy.force_shortlist_override && scored != CandidateStatus::Shortlisted {
            warn!(
                score,
                scored_tier = scored.label(),
                "force_shortlist_override is on; shortlisting regardless of score"
            );
            return self.build(CandidateStatus::Shortlisted, true);
        }
        self.build(scored, false)
    }

    fn build(&self, status: CandidateStatus, forced: bool) -> Classification {
        let (subject, template) = match status {
            CandidateStatus::Shortlisted => (&self.templates.shortlisted_subject, TemplateId::NextRound),
            CandidateStatus::OnHold => (&self.templates.on_hold_subject, TemplateId::UnderReview),
            CandidateStatus::Rejected => (&self.templates.rejected_subject, TemplateId::NotMovingForward),
        };
        Classification {
            status,
            email_subject: subject.clone(),
            template,
            attach_assignment: status == CandidateStatus::Shortlisted,
            forced,
        }
    }
}
