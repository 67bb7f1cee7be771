//! Analysis Gateway: composes a rubric prompt from a reference text and a
//! candidate artifact, sends it to the model, and parses a score out of the
//! free-form reply.
//!
//! Input problems surface as errors before any model call: an artifact that
//! cannot be decoded is `ArtifactUnreadable`, never a silent zero. Reply
//! problems never do: a reply without a score line scores 0.

pub mod artifact;
pub mod prompts;
pub mod repository;
pub mod score;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::RECRUITER_SYSTEM;
use crate::llm_client::{LlmError, TextGenerator};

pub use artifact::{read_document, Artifact};
pub use prompts::{Rubric, DESIGN_RUBRIC, FRONTEND_RUBRIC, HR_RUBRIC, RESUME_RUBRIC};
pub use repository::{GitCliFetcher, PullRequestRef, RepositoryFetcher};
pub use score::ScoreSource;

use repository::collect_source_text;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("artifact unreadable: {0}")]
    ArtifactUnreadable(String),

    #[error("invalid analysis input: {0}")]
    InvalidInput(String),

    #[error("scoring service failed: {0}")]
    Service(#[from] LlmError),

    #[error("scoring service timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub score: u8,
    /// The model's full reply.
    pub analysis: String,
    pub score_source: ScoreSource,
}

#[derive(Debug, Clone, Copy)]
pub struct GatewaySettings {
    /// Upper bound on any single model call or repository checkout.
    pub timeout: Duration,
    /// Aggregate cap on repository text placed in a prompt.
    pub max_repository_bytes: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(90),
            max_repository_bytes: 200_000,
        }
    }
}

pub struct AnalysisGateway {
    generator: Arc<dyn TextGenerator>,
    fetcher: Arc<dyn RepositoryFetcher>,
    settings: GatewaySettings,
}

impl AnalysisGateway {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        fetcher: Arc<dyn RepositoryFetcher>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            generator,
            fetcher,
            settings,
        }
    }

    /// Scores `artifact` against `reference` using `rubric`.
    pub async fn analyze(
        &self,
        rubric: &Rubric,
        artifact: &Artifact,
        reference: &str,
    ) -> Result<AnalysisResult, GatewayError> {
        require_reference(reference)?;
        let text = artifact.decode().await?;
        self.score_text(rubric, &text, reference).await
    }

    /// Repository variant: checks out the pull request, snapshots its source
    /// tree under the configured byte cap, and scores it with `rubric`.
    pub async fn analyze_repository(
        &self,
        rubric: &Rubric,
        pr: &PullRequestRef,
        preview_url: Option<&str>,
        reference: &str,
    ) -> Result<AnalysisResult, GatewayError> {
        require_reference(reference)?;

        let checkout = tokio::time::timeout(self.settings.timeout, self.fetcher.fetch(pr))
            .await
            .map_err(|_| GatewayError::ArtifactUnreadable(format!("timed out fetching {pr}")))?
            .map_err(|e| GatewayError::ArtifactUnreadable(format!("could not fetch {pr}: {e}")))?;

        let max_bytes = self.settings.max_repository_bytes;
        let snapshot =
            tokio::task::spawn_blocking(move || collect_source_text(checkout.path(), max_bytes))
                .await
                .map_err(|e| {
                    GatewayError::ArtifactUnreadable(format!("could not read {pr}: {e}"))
                })?;

        if snapshot.text.trim().is_empty() {
            return Err(GatewayError::ArtifactUnreadable(format!(
                "{pr} contains no readable source files"
            )));
        }
        if snapshot.truncated {
            warn!(pull_request = %pr, max_bytes, "Repository snapshot truncated at byte cap");
        }

        let artifact = format!(
            "Pull request: {}\nLive preview: {}\nFiles included: {}{}\n{}",
            pr.url(),
            preview_url.unwrap_or("not provided"),
            snapshot.files_included,
            if snapshot.truncated {
                " (truncated; remaining files omitted)"
            } else {
                ""
            },
            snapshot.text,
        );
        self.score_text(rubric, &artifact, reference).await
    }

    /// Free-form generation under the same timeout, for drafting text.
    pub async fn generate(&self, system: &str, prompt: &str) -> Result<String, GatewayError> {
        let text = tokio::time::timeout(
            self.settings.timeout,
            self.generator.generate(system, prompt),
        )
        .await
        .map_err(|_| GatewayError::Timeout(self.settings.timeout))??;
        Ok(text)
    }

    async fn score_text(
        &self,
        rubric: &Rubric,
        artifact: &str,
        reference: &str,
    ) -> Result<AnalysisResult, GatewayError> {
        let prompt = prompts::scoring_prompt(rubric, reference, artifact);
        let response = self.generate(RECRUITER_SYSTEM, &prompt).await?;
        let parsed = score::parse_score(&response);

        info!(score = parsed.score, source = ?parsed.source, "Analysis complete");

        Ok(AnalysisResult {
            score: parsed.score,
            analysis: response,
            score_source: parsed.source,
        })
    }
}

fn require_reference(reference: &str) -> Result<(), GatewayError> {
    if reference.trim().is_empty() {
        return Err(GatewayError::InvalidInput(
            "reference text must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFetcher, ScriptedGenerator};

    fn gateway(generator: Arc<ScriptedGenerator>, fetcher: Arc<FakeFetcher>) -> AnalysisGateway {
        AnalysisGateway::new(generator, fetcher, GatewaySettings::default())
    }

    #[tokio::test]
    async fn test_analyze_parses_score_and_keeps_full_reply() {
        let generator = Arc::new(ScriptedGenerator::replying("Score: 85\nGreat fit."));
        let gw = gateway(Arc::clone(&generator), Arc::new(FakeFetcher::empty()));

        let result = gw
            .analyze(&RESUME_RUBRIC, &Artifact::Text("Rust, 6 yrs".into()), "Need Rust")
            .await
            .unwrap();

        assert_eq!(result.score, 85);
        assert_eq!(result.analysis, "Score: 85\nGreat fit.");
        assert_eq!(result.score_source, ScoreSource::Parsed);

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Need Rust"));
        assert!(prompts[0].contains("Rust, 6 yrs"));
        assert_eq!(generator.systems(), vec![RECRUITER_SYSTEM.to_string()]);
    }

    #[tokio::test]
    async fn test_reply_without_score_defaults_to_zero() {
        let generator = Arc::new(ScriptedGenerator::replying("Looks promising overall."));
        let gw = gateway(generator, Arc::new(FakeFetcher::empty()));

        let result = gw
            .analyze(&RESUME_RUBRIC, &Artifact::Text("resume".into()), "jd")
            .await
            .unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.score_source, ScoreSource::Missing);
        assert_eq!(result.analysis, "Looks promising overall.");
    }

    #[tokio::test]
    async fn test_unreadable_artifact_skips_model_call() {
        let generator = Arc::new(ScriptedGenerator::replying("Score: 99"));
        let gw = gateway(Arc::clone(&generator), Arc::new(FakeFetcher::empty()));

        let err = gw
            .analyze(
                &RESUME_RUBRIC,
                &Artifact::document("resume.txt", vec![0xc3, 0x28]),
                "jd",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ArtifactUnreadable(_)));
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reference_is_invalid_input() {
        let gw = gateway(
            Arc::new(ScriptedGenerator::replying("Score: 1")),
            Arc::new(FakeFetcher::empty()),
        );
        let err = gw
            .analyze(&RESUME_RUBRIC, &Artifact::Text("resume".into()), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_service_failure_surfaces() {
        let gw = gateway(
            Arc::new(ScriptedGenerator::failing()),
            Arc::new(FakeFetcher::empty()),
        );
        let err = gw
            .analyze(&RESUME_RUBRIC, &Artifact::Text("resume".into()), "jd")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Service(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_model_call_times_out() {
        let generator = Arc::new(ScriptedGenerator::stalled());
        let gw = AnalysisGateway::new(
            generator,
            Arc::new(FakeFetcher::empty()),
            GatewaySettings {
                timeout: Duration::from_secs(5),
                max_repository_bytes: 1_000,
            },
        );
        let err = gw
            .analyze(&RESUME_RUBRIC, &Artifact::Text("resume".into()), "jd")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(d) if d == Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_repository_variant_includes_source_under_cap() {
        let generator = Arc::new(ScriptedGenerator::replying("Score: 58"));
        let fetcher = Arc::new(FakeFetcher::with_files(&[
            ("src/App.tsx", "export const App = () => <Todo />;"),
            ("node_modules/x/index.js", "ignored"),
        ]));
        let gw = gateway(Arc::clone(&generator), Arc::clone(&fetcher));
        let pr = PullRequestRef::parse("https://github.com/a/b/pull/1").unwrap();

        let result = gw
            .analyze_repository(&FRONTEND_RUBRIC, &pr, Some("https://b.dev"), "Build a todo app")
            .await
            .unwrap();

        assert_eq!(result.score, 58);
        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("Assignment Requirements:\nBuild a todo app"));
        assert!(prompt.contains("Code quality (40 points)"));
        assert!(prompt.contains("--- src/App.tsx ---"));
        assert!(prompt.contains("Live preview: https://b.dev"));
        assert!(!prompt.contains("ignored"));
        assert_eq!(fetcher.fetched(), vec![pr]);
    }

    #[tokio::test]
    async fn test_repository_fetch_failure_is_unreadable() {
        let generator = Arc::new(ScriptedGenerator::replying("Score: 58"));
        let gw = gateway(Arc::clone(&generator), Arc::new(FakeFetcher::failing()));
        let pr = PullRequestRef::parse("https://github.com/a/b/pull/1").unwrap();

        let err = gw.analyze_repository(&FRONTEND_RUBRIC, &pr, None, "brief").await.unwrap_err();
        assert!(matches!(err, GatewayError::ArtifactUnreadable(_)));
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_single_oversized_section_is_still_scored() {
        let generator = Arc::new(ScriptedGenerator::replying("Score: 33"));
        let body = "const x = 1;\n".repeat(40);
        let fetcher = Arc::new(FakeFetcher::with_files(&[("src/app.ts", &body)]));
        let gw = AnalysisGateway::new(
            Arc::clone(&generator) as Arc<dyn TextGenerator>,
            fetcher,
            GatewaySettings {
                timeout: Duration::from_secs(5),
                max_repository_bytes: 100,
            },
        );
        let pr = PullRequestRef::parse("https://github.com/a/b/pull/1").unwrap();

        let result = gw
            .analyze_repository(&FRONTEND_RUBRIC, &pr, None, "brief")
            .await
            .unwrap();
        assert_eq!(result.score, 33);
        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("--- src/app.ts ---"));
        assert!(prompt.contains("(truncated; remaining files omitted)"));
    }

    #[tokio::test]
    async fn test_repository_without_sources_is_unreadable() {
        let gw = gateway(
            Arc::new(ScriptedGenerator::replying("Score: 58")),
            Arc::new(FakeFetcher::empty()),
        );
        let pr = PullRequestRef::parse("https://github.com/a/b/pull/1").unwrap();
        let err = gw.analyze_repository(&FRONTEND_RUBRIC, &pr, None, "brief").await.unwrap_err();
        assert!(matches!(err, GatewayError::ArtifactUnreadable(_)));
    }
}
