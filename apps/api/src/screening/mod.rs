//! Screening: score-to-tier classification and role-track resolution.

pub mod classifier;
pub mod tracks;

pub use classifier::{Classification, Classifier, EmailTemplates, ScreeningPolicy, TemplateId};
pub use tracks::{AssignmentCatalog, RoleTrack};
