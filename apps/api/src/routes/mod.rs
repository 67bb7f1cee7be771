pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::requisitions::handlers as requisitions;
use crate::state::AppState;
use crate::submission::handlers as submissions;

/// Uploaded resumes and portfolios are read fully into memory.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Requisitions
        .route("/api/create-jd", post(requisitions::handle_create_jd))
        .route(
            "/api/create-requisition",
            post(requisitions::handle_create_requisition),
        )
        .route(
            "/api/requisitions",
            get(requisitions::handle_list_requisitions),
        )
        .route("/api/roles", get(requisitions::handle_list_roles))
        // Applications
        .route("/api/apply", post(submissions::handle_apply))
        .route("/api/candidates", get(submissions::handle_list_candidates))
        .route("/api/upload-resume", post(submissions::handle_upload_resume))
        // Assignment reviews
        .route("/api/pr-review", post(submissions::handle_pr_review))
        .route(
            "/api/portfolio-review",
            post(submissions::handle_portfolio_review),
        )
        .route("/api/reviews", get(submissions::handle_list_reviews))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::store::{JsonFileBackend, RecordStore};
    use crate::testing::Seams;

    const BOUNDARY: &str = "hireflow-test-boundary";

    struct App {
        dir: TempDir,
        seams: Seams,
        router: Router,
    }

    async fn app(reply: &str) -> App {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let vars: HashMap<&str, String> = HashMap::from([
            ("ANTHROPIC_API_KEY", "test".to_string()),
            ("RESEND_API_KEY", "test".to_string()),
            ("DATA_DIR", root.join("data").display().to_string()),
            ("UPLOAD_DIR", root.join("resume").display().to_string()),
            ("ASSIGNMENT_DIR", root.join("assignment").display().to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        std::fs::create_dir_all(&config.assignment_dir).unwrap();
        std::fs::write(config.assignment_dir.join("frontend.pdf"), b"%PDF-1.4 brief").unwrap();

        let backend = JsonFileBackend::new(&config.data_dir);
        backend.init().await.unwrap();
        let store = Arc::new(RecordStore::new(Arc::new(backend)));

        let seams = Seams::scoring(reply);
        let state = AppState::assemble(
            &config,
            store,
            seams.generator.clone(),
            seams.fetcher.clone(),
            seams.mailer.clone(),
        );
        App {
            dir,
            seams,
            router: build_router(state),
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_multipart(uri: &str, fields: &[(&str, &str)], file: (&str, &str, &str)) -> Request<Body> {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        let (field, file_name, content) = file;
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/plain\r\n\r\n{content}\r\n--{BOUNDARY}--\r\n"
        ));
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app("Score: 1").await;
        let (status, body) = send(&app.router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "hireflow");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = app("Score: 1").await;
        let (status, body) = send(&app.router, get("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "No route for /api/nope");
    }

    #[tokio::test]
    async fn test_requisition_then_roles() {
        let app = app("Score: 1").await;
        let (status, body) = send(
            &app.router,
            post_json(
                "/api/create-requisition",
                json!({"role": "Frontend Dev", "yearsOfExperience": "3", "jobDescription": "Need React"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["requisition"]["status"], "OPEN");
        assert_eq!(body["requisition"]["yearsOfExperience"], 3);

        let (_, roles) = send(&app.router, get("/api/roles")).await;
        assert_eq!(roles, json!(["Frontend Dev"]));
        let (_, list) = send(&app.router, get("/api/requisitions")).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_jd_returns_draft() {
        let app = app("Frontend Developer\n\nWe are hiring.").await;
        let (status, body) = send(
            &app.router,
            post_json("/api/create-jd", json!({"role": "Frontend Dev", "yearsOfExperience": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobDescription"], "Frontend Developer\n\nWe are hiring.");
    }

    #[tokio::test]
    async fn test_apply_multipart_stores_upload_and_candidate() {
        let app = app("Score: 85\nGreat.").await;
        send(
            &app.router,
            post_json(
                "/api/create-requisition",
                json!({"role": "Frontend Dev", "yearsOfExperience": 3, "jobDescription": "Need React"}),
            ),
        )
        .await;

        let (status, body) = send(
            &app.router,
            post_multipart(
                "/api/apply",
                &[("name", "Ann"), ("email", "ann@x.com"), ("role", "Frontend Dev")],
                ("resume", "cv.txt", "React, 5 yrs"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);
        assert_eq!(body["candidate"]["status"], "SHORTLISTED");
        assert_eq!(body["warnings"], json!([]));

        let stored_name = body["candidate"]["resumeFileName"].as_str().unwrap();
        assert!(stored_name.ends_with("-cv.txt"));
        let written = std::fs::read(app.dir.path().join("resume").join(stored_name)).unwrap();
        assert_eq!(written, b"React, 5 yrs");

        let sent = app.seams.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].attachments[0].filename, "frontend.pdf");

        let (_, candidates) = send(&app.router, get("/api/candidates")).await;
        assert_eq!(candidates.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_for_unknown_role_is_bad_request() {
        let app = app("Score: 85").await;
        let (status, body) = send(
            &app.router,
            post_multipart(
                "/api/apply",
                &[("name", "Ann"), ("email", "ann@x.com"), ("role", "Astronaut")],
                ("resume", "cv.txt", "Rust"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "ROLE_NOT_FOUND");
        assert!(app.seams.generator.prompts().is_empty());
        assert!(upload_dir_is_empty(&app));
    }

    fn upload_dir_is_empty(app: &App) -> bool {
        match std::fs::read_dir(app.dir.path().join("resume")) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }

    #[tokio::test]
    async fn test_rejected_apply_leaves_no_upload() {
        let app = app("Score: 85").await;
        let (status, body) = send(
            &app.router,
            post_multipart(
                "/api/apply",
                &[("name", ""), ("email", "ann@x.com"), ("role", "Frontend Dev")],
                ("resume", "cv.txt", "Rust"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(upload_dir_is_empty(&app));
    }

    #[tokio::test]
    async fn test_upload_resume_scores_against_given_description() {
        let app = app("Score: 64\nSolid React, little testing.").await;
        let (status, body) = send(
            &app.router,
            post_multipart(
                "/api/upload-resume",
                &[("jobDescription", "Senior React engineer"), ("email", "ann@x.com")],
                ("resume", "cv.txt", "React, 5 yrs"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);
        assert_eq!(body["score"], 64);
        assert_eq!(body["fileName"], "cv.txt");
        assert!(app.seams.generator.prompts()[0].contains("Senior React engineer"));

        let sent = app.seams.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Your Resume Analysis Results");
        assert!(sent[0].html.contains("Compatibility Score: 64%"));

        assert!(upload_dir_is_empty(&app));
        let (_, candidates) = send(&app.router, get("/api/candidates")).await;
        assert_eq!(candidates, json!([]));
    }

    #[tokio::test]
    async fn test_pr_review_with_bad_url_is_validation_error() {
        let app = app("Score: 85").await;
        let (status, body) = send(
            &app.router,
            post_json(
                "/api/pr-review",
                json!({
                    "name": "Ann",
                    "email": "ann@x.com",
                    "role": "Frontend Dev",
                    "prUrl": "https://github.com/a/b/issues/1",
                    "previewUrl": "https://b.dev"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(app.seams.mailer.sent().is_empty());

        let (_, reviews) = send(&app.router, get("/api/reviews")).await;
        assert_eq!(reviews, json!([]));
    }
}
