//! Job requisitions: drafting, intake and the role list shown to applicants.

pub mod handlers;
pub mod prompts;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::AnalysisGateway;
use crate::errors::AppError;
use crate::models::{RecordId, Requisition, RequisitionStatus};
use crate::notify::templates::requisition_admin_html;
use crate::notify::{NotificationWarning, Notifier};
use crate::store::RecordStore;
use crate::submission::validation::require_text;

/// Years of experience as sent by forms: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum YearsInput {
    Number(u64),
    Text(String),
}

impl YearsInput {
    fn parse(input: Option<&YearsInput>) -> Result<u32, AppError> {
        let invalid = || AppError::Validation("yearsOfExperience must be a whole number".to_string());
        let years = match input {
            None => return Err(AppError::Validation("yearsOfExperience is required".to_string())),
            Some(YearsInput::Number(n)) => u32::try_from(*n).map_err(|_| invalid())?,
            Some(YearsInput::Text(text)) if text.trim().is_empty() => {
                return Err(AppError::Validation("yearsOfExperience is required".to_string()))
            }
            Some(YearsInput::Text(text)) => text.trim().parse::<u32>().map_err(|_| invalid())?,
        };
        if years == 0 {
            return Err(AppError::Validation(
                "yearsOfExperience must be at least 1".to_string(),
            ));
        }
        Ok(years)
    }
}

#[derive(Debug, Clone)]
pub struct NewRequisition {
    pub role: String,
    pub years_of_experience: Option<YearsInput>,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRequisition {
    pub requisition: Requisition,
    pub warnings: Vec<NotificationWarning>,
}

pub struct RequisitionService {
    store: Arc<RecordStore>,
    gateway: Arc<AnalysisGateway>,
    notifier: Notifier,
    admin_email: Option<String>,
    company_name: String,
}

impl RequisitionService {
    pub fn new(
        store: Arc<RecordStore>,
        gateway: Arc<AnalysisGateway>,
        notifier: Notifier,
        admin_email: Option<String>,
        company_name: String,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
            admin_email,
            company_name,
        }
    }

    /// One model call; the reply is returned verbatim.
    pub async fn draft_job_description(
        &self,
        role: &str,
        years: Option<&YearsInput>,
    ) -> Result<String, AppError> {
        let role = require_text("role", role)?;
        let years = YearsInput::parse(years)?;
        let prompt = prompts::job_description_prompt(&role, years, &self.company_name);
        let draft = self
            .gateway
            .generate(prompts::JOB_DESCRIPTION_SYSTEM, &prompt)
            .await?;
        info!(role = %role, years, chars = draft.len(), "Job description drafted");
        Ok(draft)
    }

    pub async fn create(&self, input: NewRequisition) -> Result<CreatedRequisition, AppError> {
        let requisition = Requisition {
            id: RecordId::generate(),
            role: require_text("role", &input.role)?,
            years_of_experience: YearsInput::parse(input.years_of_experience.as_ref())?,
            job_description: require_text("jobDescription", &input.job_description)?,
            created_at: Utc::now(),
            status: RequisitionStatus::Open,
        };
        let requisition = self.store.upsert(requisition).await?;
        info!(id = %requisition.id, role = %requisition.role, "Requisition created");

        let mut warnings = Vec::new();
        if let Some(admin) = &self.admin_email {
            let subject = format!("New Job Requisition: {}", requisition.role);
            let report = self
                .notifier
                .notify(admin, &subject, requisition_admin_html(&requisition), &[])
                .await;
            warnings.extend(report.into_warning(admin, &subject));
        }

        Ok(CreatedRequisition {
            requisition,
            warnings,
        })
    }

    pub async fn list(&self) -> Result<Vec<Requisition>, AppError> {
        Ok(self.store.get().await?)
    }

    /// Distinct roles in first-seen order.
    pub async fn roles(&self) -> Result<Vec<String>, AppError> {
        let requisitions: Vec<Requisition> = self.store.get().await?;
        let mut seen = HashSet::new();
        Ok(requisitions
            .into_iter()
            .filter_map(|r| seen.insert(r.role.clone()).then_some(r.role))
            .collect())
    }
}
