pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::dashboard::handlers;
use crate::state::AppState;

/// Resumes above this size are rejected before reaching the handler.
const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route("/api/v1/sessions/:id", get(handlers::handle_get_session))
        .route("/api/v1/sessions/:id/email", put(handlers::handle_set_email))
        .route(
            "/api/v1/sessions/:id/resume",
            post(handlers::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_RESUME_BYTES)),
        )
        .route(
            "/api/v1/sessions/:id/resume/status",
            get(handlers::handle_resume_status),
        )
        .route(
            "/api/v1/sessions/:id/refresh",
            post(handlers::handle_refresh_jobs),
        )
        .route(
            "/api/v1/sessions/:id/matches/load",
            post(handlers::handle_load_matches),
        )
        .route(
            "/api/v1/sessions/:id/feedback",
            post(handlers::handle_feedback),
        )
        .route(
            "/api/v1/sessions/:id/skill-gap",
            get(handlers::handle_skill_gap),
        )
        .route(
            "/api/v1/sessions/:id/skill-gap.svg",
            get(handlers::handle_skill_gap_svg),
        )
        .route("/api/v1/sessions/:id/courses", get(handlers::handle_courses))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::dashboard::{Dashboard, SessionRegistry};
    use crate::gateways::match_store::MatchStore;
    use crate::gateways::testing::{
        EchoCourseSearch, FailingMatchStore, FixedStatusTransport, MemoryFeedbackSink,
        MemoryMatchStore, MemoryObjectStore, RecordingInvoker,
    };
    use crate::gateways::{
        FeedbackRecorder, InvocationGateway, JobRefreshGateway, MatchStoreReader,
        ObjectStoreGateway,
    };
    use crate::models::JobMatch;

    struct TestApp {
        router: Router,
        objects: Arc<MemoryObjectStore>,
        invoker: Arc<RecordingInvoker>,
        feedback: Arc<MemoryFeedbackSink>,
    }

    fn test_app(store: impl MatchStore + 'static) -> TestApp {
        let objects = Arc::new(MemoryObjectStore::default());
        let invoker = Arc::new(RecordingInvoker::default());
        let feedback = Arc::new(MemoryFeedbackSink::default());
        let config = crate::config::Config::for_tests();

        let dashboard = Dashboard::new(
            ObjectStoreGateway::new(objects.clone(), config.upload_prefix.clone()),
            InvocationGateway::new(invoker.clone()),
            JobRefreshGateway::new(
                config.job_refresh_endpoint.clone(),
                Arc::new(FixedStatusTransport::new(200)),
            ),
            MatchStoreReader::new(Arc::new(store)),
            FeedbackRecorder::new(feedback.clone()),
            Arc::new(EchoCourseSearch::default()),
        );
        let state = AppState {
            dashboard,
            sessions: SessionRegistry::default(),
        };
        TestApp {
            router: build_router(state),
            objects,
            invoker,
            feedback,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn new_session(router: &Router) -> String {
        let (status, body) = send(router, empty_request("POST", "/api/v1/sessions")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["view"]["phase"], "no_email");
        body["session_id"].as_str().unwrap().to_string()
    }

    fn sample_matches() -> Vec<JobMatch> {
        vec![
            JobMatch {
                title: Some("Data Engineer".to_string()),
                company: Some("Acme".to_string()),
                missing_skills: Some(vec!["python".to_string(), "sql".to_string()]),
                ..Default::default()
            },
            JobMatch {
                title: Some("Analyst".to_string()),
                company: Some("Initech".to_string()),
                missing_skills: Some(vec!["python".to_string(), "AWS".to_string()]),
                ..Default::default()
            },
        ]
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(MemoryMatchStore::default());
        let (status, body) = send(&app.router, empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let app = test_app(MemoryMatchStore::default());
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&app.router, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_load_and_feedback_flow() {
        let app = test_app(MemoryMatchStore::default().with_matches("a@x.com", sample_matches()));
        let id = new_session(&app.router).await;

        let (_, body) = send(
            &app.router,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/email"),
                json!({ "email": "a@x.com" }),
            ),
        )
        .await;
        assert_eq!(body["phase"], "email_entered");

        let (status, body) = send(
            &app.router,
            empty_request("POST", &format!("/api/v1/sessions/{id}/matches/load")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "matches_loaded");
        assert_eq!(body["matches"][0]["title"], "Data Engineer");
        assert_eq!(body["skill_gap"][0], json!({ "skill": "python", "count": 2 }));

        let (status, body) = send(
            &app.router,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/feedback"),
                json!({ "index": 1, "feedback": "dislike" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notices"][0]["message"], "Disliked!");
        let records = app.feedback.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company, "Initech");

        let (status, body) = send(
            &app.router,
            empty_request("GET", &format!("/api/v1/sessions/{id}/courses")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "python+sql+AWS");
    }

    #[tokio::test]
    async fn test_feedback_with_bad_index_is_400() {
        let app = test_app(MemoryMatchStore::default().with_matches("a@x.com", sample_matches()));
        let id = new_session(&app.router).await;
        send(
            &app.router,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/email"),
                json!({ "email": "a@x.com" }),
            ),
        )
        .await;
        send(
            &app.router,
            empty_request("POST", &format!("/api/v1/sessions/{id}/matches/load")),
        )
        .await;

        let (status, _) = send(
            &app.router,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/feedback"),
                json!({ "index": 7, "feedback": "like" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.feedback.records().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_unconfigured_reports_notice() {
        let app = test_app(MemoryMatchStore::default());
        let id = new_session(&app.router).await;
        send(
            &app.router,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/email"),
                json!({ "email": "a@x.com" }),
            ),
        )
        .await;

        let (status, body) = send(
            &app.router,
            empty_request("POST", &format!("/api/v1/sessions/{id}/refresh")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notices"][0]["level"], "error");
        assert_eq!(
            body["notices"][0]["message"],
            "Error: JOB_REFRESH_ENDPOINT not configured"
        );
    }

    #[tokio::test]
    async fn test_multipart_upload_stores_and_triggers() {
        let app = test_app(MemoryMatchStore::default());
        let id = new_session(&app.router).await;
        send(
            &app.router,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/email"),
                json!({ "email": "a@x.com" }),
            ),
        )
        .await;

        let boundary = "X-RESUME-BOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cv.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.4...\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/sessions/{id}/resume"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["notices"][0]["message"],
            "Uploaded to S3: resumes/a_x.com.pdf"
        );
        let (bytes, _) = app.objects.get("resumes/a_x.com.pdf").unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.4...");
        assert_eq!(
            app.invoker.events(),
            vec![json!({ "s3_key": "resumes/a_x.com.pdf", "user_id": "a@x.com" })]
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_a_notice_not_an_error_status() {
        let app = test_app(FailingMatchStore);
        let id = new_session(&app.router).await;
        send(
            &app.router,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/email"),
                json!({ "email": "a@x.com" }),
            ),
        )
        .await;

        let (status, body) = send(
            &app.router,
            empty_request("POST", &format!("/api/v1/sessions/{id}/matches/load")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "email_entered");
        assert_eq!(body["notices"][0]["level"], "error");

        let (status, body) = send(
            &app.router,
            empty_request("GET", &format!("/api/v1/sessions/{id}/resume/status")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], Value::Null);
        assert_eq!(body["notices"][0]["level"], "error");
    }

    #[tokio::test]
    async fn test_malformed_document_renders_placeholders() {
        let store = MemoryMatchStore::default().with_raw(
            "a@x.com",
            json!({
                "user_id": "a@x.com",
                "results": [{ "company": 7, "missing_skills": [null, "Go"] }]
            }),
        );
        let app = test_app(store);
        let id = new_session(&app.router).await;
        send(
            &app.router,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/email"),
                json!({ "email": "a@x.com" }),
            ),
        )
        .await;

        let (status, body) = send(
            &app.router,
            empty_request("POST", &format!("/api/v1/sessions/{id}/matches/load")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "matches_loaded");
        assert_eq!(body["matches"][0]["title"], "Untitled role");
        assert_eq!(body["matches"][0]["company"], "7");
        assert_eq!(body["skill_gap"][0], json!({ "skill": "go", "count": 1 }));
    }

    #[tokio::test]
    async fn test_skill_gap_svg_empty_is_no_content() {
        let app = test_app(MemoryMatchStore::default());
        let id = new_session(&app.router).await;
        let (status, _) = send(
            &app.router,
            empty_request("GET", &format!("/api/v1/sessions/{id}/skill-gap.svg")),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
