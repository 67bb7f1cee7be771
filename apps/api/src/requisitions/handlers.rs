use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{CreatedRequisition, NewRequisition, YearsInput};
use crate::errors::AppError;
use crate::models::Requisition;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    #[serde(default)]
    pub role: String,
    pub years_of_experience: Option<YearsInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequisitionRequest {
    #[serde(default)]
    pub role: String,
    pub years_of_experience: Option<YearsInput>,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct CreateRequisitionResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(flatten)]
    pub created: CreatedRequisition,
}

/// POST /api/create-jd
pub async fn handle_create_jd(
    State(state): State<AppState>,
    Json(req): Json<DraftRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    let job_description = state
        .requisitions
        .draft_job_description(&req.role, req.years_of_experience.as_ref())
        .await?;
    Ok(Json(DraftResponse { job_description }))
}

/// POST /api/create-requisition
pub async fn handle_create_requisition(
    State(state): State<AppState>,
    Json(req): Json<CreateRequisitionRequest>,
) -> Result<Json<CreateRequisitionResponse>, AppError> {
    let created = state
        .requisitions
        .create(NewRequisition {
            role: req.role,
            years_of_experience: req.years_of_experience,
            job_description: req.job_description,
        })
        .await?;
    Ok(Json(CreateRequisitionResponse {
        success: true,
        message: "Requisition created",
        created,
    }))
}

/// GET /api/requisitions
pub async fn handle_list_requisitions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Requisition>>, AppError> {
    Ok(Json(state.requisitions.list().await?))
}

/// GET /api/roles
pub async fn handle_list_roles(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.requisitions.roles().await?))
}
