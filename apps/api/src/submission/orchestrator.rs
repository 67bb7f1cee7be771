//! Application, review and resume-check flows. Each submission walks
//! Received → Validated → Analyzed → Classified → Persisted → Notified → Done,
//! dropping to Failed at the first error. Uploads reach disk only once the
//! submission has been scored. Mail is sent only after the record is stored
//! and never fails the submission.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Days, Utc};
use serde::Serialize;
use tracing::info;

use super::stage::{StageTracker, SubmissionStage};
use super::uploads::UploadDir;
use super::validation::{
    optional_text, require_text, validate_email, validate_preview_url, validate_pull_request_url,
};
use crate::analysis::{
    read_document, AnalysisGateway, AnalysisResult, Artifact, PullRequestRef, RESUME_RUBRIC,
};
use crate::errors::AppError;
use crate::models::{
    Candidate, CandidateAnalysis, CandidateStatus, PrSubmission, RecordId, Requisition, Review,
    ReviewAnalysis,
};
use crate::notify::templates::{
    candidate_status_html, interview_invite_html, resume_analysis_html, review_admin_html,
    review_confirmation_html, StatusEmail,
};
use crate::notify::{AttachmentSource, NotificationWarning, Notifier};
use crate::screening::{AssignmentCatalog, Classification, Classifier, RoleTrack};
use crate::store::RecordStore;

/// A file received from the caller, held in memory until the submission is scored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct ApplicationSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: Option<String>,
    pub role: String,
    pub resume: Option<UploadedFile>,
}

/// The two review forms.
#[derive(Debug, Clone)]
pub enum ReviewWork {
    PullRequest {
        pr_url: String,
        preview_url: Option<String>,
    },
    Portfolio {
        file: Option<UploadedFile>,
    },
}

#[derive(Debug, Clone)]
pub struct ReviewSubmission {
    pub name: String,
    pub email: String,
    pub role: String,
    pub work: ReviewWork,
    pub comments: Option<String>,
}

/// A one-off resume score against a caller-supplied job description.
#[derive(Debug, Clone)]
pub struct ResumeCheck {
    pub job_description: String,
    pub resume: Option<UploadedFile>,
    /// Receives the score and analysis when present.
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeCheckOutcome {
    pub file_name: String,
    pub score: u8,
    pub analysis: String,
    pub warnings: Vec<NotificationWarning>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationOutcome {
    pub candidate: Candidate,
    pub warnings: Vec<NotificationWarning>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub review: Review,
    pub candidate_id: RecordId,
    pub warnings: Vec<NotificationWarning>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub admin_email: Option<String>,
    pub company_name: String,
    pub assignment_deadline_days: u32,
    /// When off, PR reviews are scored from their links instead of a checkout.
    pub repository_analysis: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            admin_email: None,
            company_name: "Stage".to_string(),
            assignment_deadline_days: 3,
            repository_analysis: true,
        }
    }
}

struct ValidApplication {
    name: String,
    email: String,
    phone: Option<String>,
    cover_letter: Option<String>,
    role: String,
    track: RoleTrack,
    resume: UploadedFile,
}

enum ValidWork {
    PullRequest {
        pr: PullRequestRef,
        pr_url: String,
        preview_url: Option<String>,
    },
    Portfolio(UploadedFile),
}

struct ValidReview {
    name: String,
    email: String,
    role: String,
    track: RoleTrack,
    work: ValidWork,
    comments: Option<String>,
}

pub struct Orchestrator {
    store: Arc<RecordStore>,
    gateway: Arc<AnalysisGateway>,
    notifier: Notifier,
    classifier: Classifier,
    assignments: AssignmentCatalog,
    uploads: UploadDir,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        store: Arc<RecordStore>,
        gateway: Arc<AnalysisGateway>,
        notifier: Notifier,
        classifier: Classifier,
        assignments: AssignmentCatalog,
        uploads: UploadDir,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
            classifier,
            assignments,
            uploads,
            settings,
        }
    }

    /// Scores a resume against the role's requisition, stores the candidate
    /// and mails them the outcome for their tier.
    pub async fn submit_application(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationOutcome, AppError> {
        let mut stage = StageTracker::start("application");

        let application = validate_application(submission).map_err(|e| stage.fail(e))?;
        let requisitions: Vec<Requisition> = self
            .store
            .get()
            .await
            .map_err(|e| stage.fail(e.into()))?;
        let requisition = match Requisition::find_by_role(&requisitions, &application.role) {
            Some(r) => r,
            None => return Err(stage.fail(AppError::RoleNotFound(application.role))),
        };
        stage.advance(SubmissionStage::Validated);

        let reference = match &application.cover_letter {
            Some(letter) => format!(
                "Job Description: {}\n\nCover Letter: {letter}",
                requisition.job_description
            ),
            None => requisition.job_description.clone(),
        };
        let artifact = Artifact::document(
            application.resume.original_name.clone(),
            application.resume.bytes.clone(),
        );
        let result = self
            .gateway
            .analyze(&RESUME_RUBRIC, &artifact, &reference)
            .await
            .map_err(|e| stage.fail(e.into()))?;
        stage.advance(SubmissionStage::Analyzed);

        let classification = self.classifier.classify_application(result.score);
        info!(
            score = result.score,
            status = classification.status.label(),
            forced = classification.forced,
            "Application classified"
        );
        stage.advance(SubmissionStage::Classified);

        let resume = &application.resume;
        let stored = self
            .uploads
            .save(&resume.original_name, &resume.bytes)
            .await
            .map_err(|e| stage.fail(e))?;
        let candidate = Candidate {
            id: RecordId::generate(),
            name: application.name,
            email: application.email,
            phone: application.phone,
            cover_letter: application.cover_letter,
            role: application.role,
            resume_file_name: Some(stored.clone()),
            applied_at: Utc::now(),
            status: classification.status,
            analysis: Some(CandidateAnalysis {
                score: result.score,
                details: result.analysis,
                job_description: requisition.job_description.clone(),
            }),
            pr_submission: None,
        };
        let candidate = match self.store.upsert(candidate).await {
            Ok(candidate) => candidate,
            Err(e) => {
                self.uploads.discard(&stored).await;
                return Err(stage.fail(e.into()));
            }
        };
        stage.advance(SubmissionStage::Persisted);

        let warnings = self
            .notify_applicant(&candidate, &classification, application.track)
            .await;
        stage.advance(SubmissionStage::Notified);
        stage.advance(SubmissionStage::Done);

        Ok(ApplicationOutcome {
            candidate,
            warnings,
        })
    }

    /// Scores an assignment against the track's brief, appends the review and
    /// merges it onto the candidate with the same email.
    pub async fn submit_review(
        &self,
        submission: ReviewSubmission,
    ) -> Result<ReviewOutcome, AppError> {
        let mut stage = StageTracker::start("review");

        let review = validate_review(submission).map_err(|e| stage.fail(e))?;
        stage.advance(SubmissionStage::Validated);

        let result = self.analyze_review(&review).await.map_err(|e| stage.fail(e))?;
        stage.advance(SubmissionStage::Analyzed);

        let classification = self.classifier.classify(result.score);
        info!(
            score = result.score,
            status = classification.status.label(),
            track = ?review.track,
            "Review classified"
        );
        stage.advance(SubmissionStage::Classified);

        let (pr_url, preview_url, portfolio_file) = match review.work {
            ValidWork::PullRequest {
                pr_url,
                preview_url,
                ..
            } => (Some(pr_url), preview_url, None),
            ValidWork::Portfolio(file) => {
                let stored = self
                    .uploads
                    .save(&file.original_name, &file.bytes)
                    .await
                    .map_err(|e| stage.fail(e))?;
                (None, None, Some(stored))
            }
        };
        let record = Review {
            id: RecordId::generate(),
            name: review.name,
            email: review.email,
            role: review.role,
            track: review.track,
            pr_url,
            preview_url,
            portfolio_file,
            comments: review.comments,
            status: classification.status,
            submitted_at: Utc::now(),
            analysis: ReviewAnalysis {
                score: result.score,
                details: result.analysis,
            },
        };
        let record = match self.store.upsert(record.clone()).await {
            Ok(record) => record,
            Err(e) => {
                if let Some(stored) = &record.portfolio_file {
                    self.uploads.discard(stored).await;
                }
                return Err(stage.fail(e.into()));
            }
        };
        // The review is stored from here on; its upload stays with it.
        let candidate_id = self
            .merge_onto_candidate(&record)
            .await
            .map_err(|e| stage.fail(e))?;
        stage.advance(SubmissionStage::Persisted);

        let warnings = self.notify_reviewer(&record).await;
        stage.advance(SubmissionStage::Notified);
        stage.advance(SubmissionStage::Done);

        Ok(ReviewOutcome {
            review: record,
            candidate_id,
            warnings,
        })
    }

    /// Scores a resume against the given job description without storing
    /// anything, optionally mailing the result.
    pub async fn check_resume(&self, check: ResumeCheck) -> Result<ResumeCheckOutcome, AppError> {
        let mut stage = StageTracker::start("resume_check");

        let resume = check
            .resume
            .filter(|file| !file.bytes.is_empty())
            .ok_or_else(|| AppError::Validation("resume file is required".to_string()))
            .map_err(|e| stage.fail(e))?;
        let job_description =
            require_text("jobDescription", &check.job_description).map_err(|e| stage.fail(e))?;
        let email = match optional_text(check.email) {
            Some(email) => Some(validate_email(&email).map_err(|e| stage.fail(e))?),
            None => None,
        };
        stage.advance(SubmissionStage::Validated);

        let artifact = Artifact::document(resume.original_name.clone(), resume.bytes.clone());
        let result = self
            .gateway
            .analyze(&RESUME_RUBRIC, &artifact, &job_description)
            .await
            .map_err(|e| stage.fail(e.into()))?;
        stage.advance(SubmissionStage::Analyzed);

        let mut warnings = Vec::new();
        if let Some(email) = &email {
            let subject = "Your Resume Analysis Results";
            let report = self
                .notifier
                .notify(
                    email,
                    subject,
                    resume_analysis_html(result.score, &result.analysis),
                    &[],
                )
                .await;
            warnings.extend(report.into_warning(email, subject));
            stage.advance(SubmissionStage::Notified);
        }
        stage.advance(SubmissionStage::Done);

        Ok(ResumeCheckOutcome {
            file_name: resume.original_name,
            score: result.score,
            analysis: result.analysis,
            warnings,
        })
    }

    pub async fn candidates(&self) -> Result<Vec<Candidate>, AppError> {
        Ok(self.store.get().await?)
    }

    pub async fn reviews(&self) -> Result<Vec<Review>, AppError> {
        Ok(self.store.get().await?)
    }

    async fn analyze_review(&self, review: &ValidReview) -> Result<AnalysisResult, AppError> {
        let assignment = self.assignments.for_track(review.track).ok_or_else(|| {
            AppError::ArtifactUnreadable(format!("no assignment configured for {:?}", review.track))
        })?;
        let brief = read_document(&assignment.path).await?;
        let rubric = review
            .track
            .review_rubric(matches!(review.work, ValidWork::PullRequest { .. }));

        let result = match &review.work {
            ValidWork::PullRequest {
                pr, preview_url, ..
            } if self.settings.repository_analysis => {
                self.gateway
                    .analyze_repository(rubric, pr, preview_url.as_deref(), &brief)
                    .await?
            }
            ValidWork::PullRequest {
                pr_url,
                preview_url,
                ..
            } => {
                let mut text = format!("Pull request: {pr_url}\n");
                if let Some(preview) = preview_url {
                    text.push_str(&format!("Live preview: {preview}\n"));
                }
                if let Some(comments) = &review.comments {
                    text.push_str(&format!("Candidate comments: {comments}\n"));
                }
                self.gateway
                    .analyze(rubric, &Artifact::Text(text), &brief)
                    .await?
            }
            ValidWork::Portfolio(file) => {
                let artifact = Artifact::document(file.original_name.clone(), file.bytes.clone());
                self.gateway.analyze(rubric, &artifact, &brief).await?
            }
        };
        Ok(result)
    }

    /// Attaches the review to the candidate with the same email, creating a
    /// candidate when none exists. One locked read-modify-write.
    async fn merge_onto_candidate(&self, review: &Review) -> Result<RecordId, AppError> {
        let submission = PrSubmission {
            review_id: Some(review.id.clone()),
            url: review.pr_url.clone(),
            preview_url: review.preview_url.clone(),
            portfolio_file: review.portfolio_file.clone(),
            submitted_at: review.submitted_at,
            status: review.status,
            analysis: review.analysis.clone(),
        };
        let newcomer = Candidate {
            id: RecordId::generate(),
            name: review.name.clone(),
            email: review.email.clone(),
            phone: None,
            cover_letter: None,
            role: review.role.clone(),
            resume_file_name: None,
            applied_at: review.submitted_at,
            status: review.status,
            analysis: None,
            pr_submission: None,
        };
        let email = review.email.clone();

        let id = self
            .store
            .mutate(move |candidates: &mut Vec<Candidate>| {
                match candidates.iter_mut().find(|c| c.has_email(&email)) {
                    Some(existing) => {
                        existing.pr_submission = Some(submission);
                        existing.id.clone()
                    }
                    None => {
                        let id = newcomer.id.clone();
                        candidates.push(Candidate {
                            pr_submission: Some(submission),
                            ..newcomer
                        });
                        id
                    }
                }
            })
            .await?;
        Ok(id)
    }

    async fn notify_applicant(
        &self,
        candidate: &Candidate,
        classification: &Classification,
        track: RoleTrack,
    ) -> Vec<NotificationWarning> {
        let deadline = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(u64::from(self.settings.assignment_deadline_days)))
            .unwrap_or_else(|| Utc::now().date_naive());
        let html = candidate_status_html(&StatusEmail {
            template: classification.template,
            candidate_name: &candidate.name,
            role: &candidate.role,
            company: &self.settings.company_name,
            deadline,
        });
        let attachments: Vec<AttachmentSource> = if classification.attach_assignment {
            self.assignments
                .for_track(track)
                .map(|a| AttachmentSource {
                    filename: a.file_name.clone(),
                    path: a.path.clone(),
                })
                .into_iter()
                .collect()
        } else {
            Vec::new()
        };
        let subject = format!("{} - {}", classification.email_subject, candidate.role);

        self.notifier
            .notify(&candidate.email, &subject, html, &attachments)
            .await
            .into_warning(&candidate.email, &subject)
            .into_iter()
            .collect()
    }

    async fn notify_reviewer(&self, review: &Review) -> Vec<NotificationWarning> {
        let mut warnings = Vec::new();

        if let Some(admin) = &self.settings.admin_email {
            let subject = format!("New Assignment Review: {} - {}", review.name, review.role);
            let report = self
                .notifier
                .notify(admin, &subject, review_admin_html(review), &[])
                .await;
            warnings.extend(report.into_warning(admin, &subject));
        }

        let subject = "Assignment Submission Received".to_string();
        let report = self
            .notifier
            .notify(
                &review.email,
                &subject,
                review_confirmation_html(review, &self.settings.company_name),
                &[],
            )
            .await;
        warnings.extend(report.into_warning(&review.email, &subject));

        let interview = self.assignments.interview_link(review.track);
        match interview {
            Some(link) if review.status == CandidateStatus::Shortlisted => {
                let subject = format!(
                    "Schedule Your Round 1 Interview - {}",
                    self.settings.company_name
                );
                let html = interview_invite_html(&review.name, link, &self.settings.company_name);
                let report = self.notifier.notify(&review.email, &subject, html, &[]).await;
                warnings.extend(report.into_warning(&review.email, &subject));
            }
            None if review.status == CandidateStatus::Shortlisted => {
                info!(track = ?review.track, "No interview link configured; invite skipped");
            }
            _ => {}
        }

        warnings
    }
}

fn validate_application(submission: ApplicationSubmission) -> Result<ValidApplication, AppError> {
    let name = require_text("name", &submission.name)?;
    let email = validate_email(&submission.email)?;
    let role = require_text("role", &submission.role)?;
    let resume = submission
        .resume
        .filter(|file| !file.bytes.is_empty())
        .ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;

    Ok(ValidApplication {
        name,
        email,
        phone: optional_text(submission.phone),
        cover_letter: optional_text(submission.cover_letter),
        track: RoleTrack::resolve(&role),
        role,
        resume,
    })
}

fn validate_review(submission: ReviewSubmission) -> Result<ValidReview, AppError> {
    let name = require_text("name", &submission.name)?;
    let email = validate_email(&submission.email)?;
    let role = require_text("role", &submission.role)?;
    let track = RoleTrack::resolve(&role);

    let work = match submission.work {
        ReviewWork::PullRequest { .. } if track.requires_portfolio() => {
            return Err(AppError::Validation(format!(
                "{role} submissions require a portfolio file"
            )));
        }
        ReviewWork::Portfolio { .. } if track.requires_pull_request() => {
            return Err(AppError::Validation(format!(
                "{role} submissions require prUrl and previewUrl"
            )));
        }
        ReviewWork::PullRequest {
            pr_url,
            preview_url,
        } => {
            let (pr_url, pr) = validate_pull_request_url(&pr_url)?;
            let preview_url = match optional_text(preview_url) {
                Some(url) => Some(validate_preview_url(&url)?),
                None if track.requires_pull_request() => {
                    return Err(AppError::Validation("previewUrl is required".to_string()));
                }
                None => None,
            };
            ValidWork::PullRequest {
                pr,
                pr_url,
                preview_url,
            }
        }
        ReviewWork::Portfolio { file } => {
            let file = file
                .filter(|f| !f.bytes.is_empty())
                .ok_or_else(|| AppError::Validation("portfolio file is required".to_string()))?;
            ValidWork::Portfolio(file)
        }
    };

    Ok(ValidReview {
        name,
        email,
        role,
        track,
        work,
        comments: optional_text(submission.comments),
    })
}
