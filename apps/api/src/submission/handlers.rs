use std::collections::HashMap;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::orchestrator::{
    ApplicationOutcome, ApplicationSubmission, ResumeCheck, ResumeCheckOutcome, ReviewOutcome,
    ReviewSubmission, ReviewWork, UploadedFile,
};
use crate::errors::AppError;
use crate::models::{Candidate, Review};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SubmissionResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: T,
}

impl<T> SubmissionResponse<T> {
    fn ok(outcome: T) -> Json<Self> {
        Json(Self {
            success: true,
            outcome,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrReviewRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub pr_url: String,
    pub preview_url: Option<String>,
    pub comments: Option<String>,
}

/// Text fields plus at most one file from a multipart body.
#[derive(Default)]
struct FormParts {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

impl FormParts {
    fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}

async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<FormParts, AppError> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        AppError::Validation(format!("malformed form data: {e}"))
    };
    let mut parts = FormParts::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            let original_name = field.file_name().unwrap_or(file_field).to_string();
            let bytes: Bytes = field.bytes().await.map_err(malformed)?;
            parts.file = Some(UploadedFile {
                original_name,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(malformed)?;
            parts.fields.insert(name, value);
        }
    }
    Ok(parts)
}

/// POST /api/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmissionResponse<ApplicationOutcome>>, AppError> {
    let mut form = read_form(multipart, "resume").await?;
    let resume = form.file.take();
    let outcome = state
        .orchestrator
        .submit_application(ApplicationSubmission {
            name: form.text("name"),
            email: form.text("email"),
            phone: form.optional("phone"),
            cover_letter: form.optional("coverLetter"),
            role: form.text("role"),
            resume,
        })
        .await?;
    Ok(SubmissionResponse::ok(outcome))
}

/// POST /api/pr-review
pub async fn handle_pr_review(
    State(state): State<AppState>,
    Json(req): Json<PrReviewRequest>,
) -> Result<Json<SubmissionResponse<ReviewOutcome>>, AppError> {
    let outcome = state
        .orchestrator
        .submit_review(ReviewSubmission {
            name: req.name,
            email: req.email,
            role: req.role,
            work: ReviewWork::PullRequest {
                pr_url: req.pr_url,
                preview_url: req.preview_url,
            },
            comments: req.comments,
        })
        .await?;
    Ok(SubmissionResponse::ok(outcome))
}

/// POST /api/portfolio-review
pub async fn handle_portfolio_review(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmissionResponse<ReviewOutcome>>, AppError> {
    let mut form = read_form(multipart, "portfolio").await?;
    let file = form.file.take();
    let outcome = state
        .orchestrator
        .submit_review(ReviewSubmission {
            name: form.text("name"),
            email: form.text("email"),
            role: form.text("role"),
            work: ReviewWork::Portfolio { file },
            comments: form.optional("comments"),
        })
        .await?;
    Ok(SubmissionResponse::ok(outcome))
}

/// POST /api/upload-resume
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmissionResponse<ResumeCheckOutcome>>, AppError> {
    let mut form = read_form(multipart, "resume").await?;
    let outcome = state
        .orchestrator
        .check_resume(ResumeCheck {
            job_description: form.text("jobDescription"),
            resume: form.file.take(),
            email: form.optional("email"),
        })
        .await?;
    Ok(SubmissionResponse::ok(outcome))
}

/// GET /api/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    Ok(Json(state.orchestrator.candidates().await?))
}

/// GET /api/reviews
pub async fn handle_list_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(state.orchestrator.reviews().await?))
}
