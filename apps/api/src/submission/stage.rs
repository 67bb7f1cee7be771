use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

/// Lifecycle of one submission. `Failed` is reachable from every other stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SubmissionStage {
    Received,
    Validated,
    Analyzed,
    Classified,
    Persisted,
    Notified,
    Done,
    Failed,
}

/// Logs each transition of a submission under a per-submission id.
#[derive(Debug)]
pub struct StageTracker {
    flow: &'static str,
    submission: Uuid,
    stage: SubmissionStage,
    history: Vec<SubmissionStage>,
}

impl StageTracker {
    pub fn start(flow: &'static str) -> Self {
        let submission = Uuid::new_v4();
        info!(flow, %submission, stage = ?SubmissionStage::Received, "Submission received");
        Self {
            flow,
            submission,
            stage: SubmissionStage::Received,
            history: vec![SubmissionStage::Received],
        }
    }

    #[cfg(test)]
    pub fn stage(&self) -> SubmissionStage {
        self.stage
    }

    #[cfg(test)]
    pub fn history(&self) -> &[SubmissionStage] {
        &self.history
    }

    pub fn advance(&mut self, next: SubmissionStage) {
        debug_assert!(next > self.stage && next != SubmissionStage::Failed);
        info!(
            flow = self.flow,
            submission = %self.submission,
            from = ?self.stage,
            to = ?next,
            "Submission advanced"
        );
        self.stage = next;
        self.history.push(next);
    }

    /// Moves to `Failed` and hands the error back for propagation.
    pub fn fail(&mut self, err: AppError) -> AppError {
        warn!(
            flow = self.flow,
            submission = %self.submission,
            at = ?self.stage,
            code = err.code(),
            error = %err,
            "Submission failed"
        );
        self.stage = SubmissionStage::Failed;
        self.history.push(SubmissionStage::Failed);
        err
    }
}
