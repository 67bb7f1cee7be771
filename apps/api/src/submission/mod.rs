//! Submission Orchestrator: resume applications and assignment reviews.

pub mod handlers;
pub mod orchestrator;
pub mod stage;
pub mod uploads;
pub mod validation;

pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use uploads::UploadDir;
