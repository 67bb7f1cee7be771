use std::sync::Arc;

use crate::analysis::{AnalysisGateway, GatewaySettings, RepositoryFetcher};
use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::notify::{MailTransport, Notifier};
use crate::requisitions::RequisitionService;
use crate::screening::{AssignmentCatalog, Classifier};
use crate::store::RecordStore;
use crate::submission::{Orchestrator, OrchestratorSettings, UploadDir};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub requisitions: Arc<RequisitionService>,
}

impl AppState {
    /// Wires the services from config and the four external seams.
    pub fn assemble(
        config: &Config,
        store: Arc<RecordStore>,
        generator: Arc<dyn TextGenerator>,
        fetcher: Arc<dyn RepositoryFetcher>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        let gateway = Arc::new(AnalysisGateway::new(
            generator,
            fetcher,
            GatewaySettings {
                timeout: config.analysis_timeout,
                max_repository_bytes: config.max_repository_bytes,
            },
        ));
        let notifier = Notifier::new(transport);
        let assignments = config
            .interview_links
            .iter()
            .fold(AssignmentCatalog::from_dir(&config.assignment_dir), |catalog, (track, link)| {
                catalog.with_interview_link(*track, link.clone())
            });

        let orchestrator = Orchestrator::new(
            Arc::clone(&store),
            Arc::clone(&gateway),
            notifier.clone(),
            Classifier::new(config.screening, config.email_templates.clone()),
            assignments,
            UploadDir::new(config.upload_dir.clone()),
            OrchestratorSettings {
                admin_email: config.admin_email.clone(),
                company_name: config.company_name.clone(),
                assignment_deadline_days: config.assignment_deadline_days,
                repository_analysis: config.repository_analysis,
            },
        );
        let requisitions = RequisitionService::new(
            store,
            gateway,
            notifier,
            config.admin_email.clone(),
            config.company_name.clone(),
        );

        Self {
            orchestrator: Arc::new(orchestrator),
            requisitions: Arc::new(requisitions),
        }
    }
}
