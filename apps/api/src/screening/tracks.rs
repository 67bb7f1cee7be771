use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::{Rubric, DESIGN_RUBRIC, FRONTEND_RUBRIC, HR_RUBRIC};

/// Assignment track a role belongs to. Resolved once at intake and carried
/// through validation, assignment selection and the stored review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTrack {
    Frontend,
    Hr,
    Design,
    #[default]
    Other,
}

impl RoleTrack {
    /// Word-level match on the role title, so "Chrome Engineer" is not HR and
    /// "Guild Lead" is not UI.
    pub fn resolve(role: &str) -> Self {
        let lower = role.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has = |w: &str| words.iter().any(|word| *word == w);
        let has_pair = |a: &str, b: &str| words.windows(2).any(|pair| pair[0] == a && pair[1] == b);

        if has("frontend") || has_pair("front", "end") {
            RoleTrack::Frontend
        } else if has("hr") || has("recruiter") || has("people") || has_pair("human", "resources") {
            RoleTrack::Hr
        } else if has("design") || has("designer") || has("ux") || has("ui") {
            RoleTrack::Design
        } else {
            RoleTrack::Other
        }
    }

    /// Frontend roles submit a pull request and a live preview.
    pub fn requires_pull_request(self) -> bool {
        self == RoleTrack::Frontend
    }

    /// HR and design roles submit a portfolio document.
    pub fn requires_portfolio(self) -> bool {
        matches!(self, RoleTrack::Hr | RoleTrack::Design)
    }

    /// Rubric for an assignment review. Roles outside the three tracks are
    /// judged as code when they send a pull request, as design work otherwise.
    pub fn review_rubric(self, pull_request: bool) -> &'static Rubric {
        match (self, pull_request) {
            (RoleTrack::Frontend, _) | (RoleTrack::Other, true) => &FRONTEND_RUBRIC,
            (RoleTrack::Hr, _) => &HR_RUBRIC,
            (RoleTrack::Design, _) | (RoleTrack::Other, false) => &DESIGN_RUBRIC,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoleTrack::Frontend => "frontend",
            RoleTrack::Hr => "hr",
            RoleTrack::Design => "design",
            RoleTrack::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub file_name: String,
    pub path: PathBuf,
}

/// Explicit track → assignment document mapping, plus the round-one
/// interview link sent to shortlisted reviews.
#[derive(Debug, Clone, Default)]
pub struct AssignmentCatalog {
    assignments: HashMap<RoleTrack, Assignment>,
    interview_links: HashMap<RoleTrack, String>,
}

impl AssignmentCatalog {
    /// Standard layout: `frontend.pdf`, `hr.pdf`, `design.pdf`. Design and
    /// other tracks share the design brief.
    pub fn from_dir(dir: &Path) -> Self {
        let mut catalog = Self::default();
        for (track, file_name) in [
            (RoleTrack::Frontend, "frontend.pdf"),
            (RoleTrack::Hr, "hr.pdf"),
            (RoleTrack::Design, "design.pdf"),
            (RoleTrack::Other, "design.pdf"),
        ] {
            catalog = catalog.with(track, dir.join(file_name));
        }
        catalog
    }

    pub fn with(mut self, track: RoleTrack, path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "assignment".to_string());
        self.assignments.insert(track, Assignment { file_name, path });
        self
    }

    pub fn for_track(&self, track: RoleTrack) -> Option<&Assignment> {
        self.assignments.get(&track)
    }

    pub fn with_interview_link(mut self, track: RoleTrack, url: impl Into<String>) -> Self {
        self.interview_links.insert(track, url.into());
        self
    }

    /// None when no interview is configured for the track.
    pub fn interview_link(&self, track: RoleTrack) -> Option<&str> {
        self.interview_links.get(&track).map(String::as_str)
    }
}
