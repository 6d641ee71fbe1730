pub mod health;
pub mod resumes;
pub mod session;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::flows::handlers as ai;
use crate::state::AppState;
use crate::store::OwnerKey;

/// `?owner=` identifies whose collection a request touches.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner: Option<String>,
}

impl OwnerQuery {
    pub fn owner_key(&self) -> Result<OwnerKey, AppError> {
        Ok(OwnerKey::parse(self.owner.as_deref())?)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Dashboard
        .route(
            "/api/v1/resumes",
            get(resumes::handle_list).post(resumes::handle_create),
        )
        .route("/api/v1/resumes/:id", delete(resumes::handle_delete))
        .route(
            "/api/v1/resumes/:id/duplicate",
            post(resumes::handle_duplicate),
        )
        .route("/api/v1/resumes/:id/render", get(resumes::handle_render))
        // Editor session
        .route("/api/v1/session", get(session::handle_get_active))
        .route("/api/v1/session/open/:id", post(session::handle_open))
        .route("/api/v1/session/draft", post(session::handle_new_draft))
        .route("/api/v1/session/field", patch(session::handle_update_field))
        .route(
            "/api/v1/session/responsibilities",
            post(session::handle_edit_responsibility),
        )
        .route("/api/v1/session/save", post(session::handle_save))
        .route("/api/v1/session/render", get(session::handle_render_active))
        // AI flows
        .route("/api/v1/ai/summary", post(ai::handle_summary))
        .route("/api/v1/ai/bullets", post(ai::handle_bullets))
        .route("/api/v1/ai/cover-letter", post(ai::handle_cover_letter))
        .route("/api/v1/ai/skills", post(ai::handle_skills))
        .route("/api/v1/ai/ats-score", post(ai::handle_ats_score))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::flows::tests::ScriptedGenerator;
    use crate::llm_client::TextGenerator;
    use crate::store::backend::MemoryStorage;
    use crate::store::tests::SlowStorage;
    use crate::store::DocumentStore;

    fn app_with(generator: Option<Arc<dyn TextGenerator>>) -> Router {
        let store = DocumentStore::new(Arc::new(MemoryStorage::new()));
        build_router(AppState::new(store, generator))
    }

    fn app() -> Router {
        app_with(None)
    }

    fn slow_app() -> (Router, AppState) {
        let store = DocumentStore::new(Arc::new(SlowStorage::default()));
        let state = AppState::new(store, None);
        (build_router(state.clone()), state)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create(app: &Router, owner: &str, name: &str) -> Value {
        let response = send(
            app,
            Method::POST,
            &format!("/api/v1/resumes?owner={owner}"),
            Some(json!({ "name": name, "email": "ada@example.com" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    #[tokio::test]
    async fn test_concurrent_creates_keep_both_records() {
        let (app, state) = slow_app();
        let body = json!({ "name": "Ada", "email": "ada@example.com" });

        let (first, second) = tokio::join!(
            send(&app, Method::POST, "/api/v1/resumes?owner=ada", Some(body.clone())),
            send(&app, Method::POST, "/api/v1/resumes?owner=ada", Some(body)),
        );
        assert_eq!(first.status(), StatusCode::CREATED);
        assert_eq!(second.status(), StatusCode::CREATED);

        let listed = body_json(send(&app, Method::GET, "/api/v1/resumes?owner=ada", None).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 2);
        assert_eq!(state.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_create_and_duplicate_keep_all_records() {
        let (app, _) = slow_app();
        let created = create(&app, "ada", "Ada").await;
        let id = created["id"].as_str().unwrap();

        let duplicate_uri = format!("/api/v1/resumes/{id}/duplicate?owner=ada");
        let (copy, fresh) = tokio::join!(
            send(&app, Method::POST, &duplicate_uri, None),
            send(
                &app,
                Method::POST,
                "/api/v1/resumes?owner=ada",
                Some(json!({ "name": "Ada", "email": "ada@example.com" })),
            ),
        );
        assert_eq!(copy.status(), StatusCode::CREATED);
        assert_eq!(fresh.status(), StatusCode::CREATED);

        let listed = body_json(send(&app, Method::GET, "/api/v1/resumes?owner=ada", None).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_session_reads_do_not_allocate_sessions() {
        let store = DocumentStore::new(Arc::new(MemoryStorage::new()));
        let state = AppState::new(store, None);
        let app = build_router(state.clone());

        for owner in ["a", "b", "c"] {
            let response = send(&app, Method::GET, &format!("/api/v1/session?owner={owner}"), None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let response = send(
                &app,
                Method::GET,
                &format!("/api/v1/session/render?owner={owner}"),
                None,
            )
            .await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let response = send(
                &app,
                Method::POST,
                &format!("/api/v1/session/open/{}?owner={owner}", uuid::Uuid::new_v4()),
                None,
            )
            .await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
        assert_eq!(state.sessions.len().await, 0);

        // An open document keeps its session; deleting it releases the slot.
        let created = create(&app, "ada", "Ada").await;
        let id = created["id"].as_str().unwrap();
        send(&app, Method::POST, &format!("/api/v1/session/open/{id}?owner=ada"), None).await;
        assert_eq!(state.sessions.len().await, 1);
        send(&app, Method::DELETE, &format!("/api/v1/resumes/{id}?owner=ada"), None).await;
        assert_eq!(state.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let response = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
        assert_eq!(body["ai"], false);
    }

    #[tokio::test]
    async fn test_missing_owner_is_unauthorized() {
        let app = app();
        let response = send(&app, Method::GET, "/api/v1/resumes", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let response = send(&app, Method::GET, "/api/v1/resumes?owner=%20", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_edit_then_save_reaches_dashboard() {
        let app = app();
        let created = create(&app, "ada", "Ada Lovelace").await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = send(
            &app,
            Method::POST,
            &format!("/api/v1/session/open/{id}?owner=ada"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["state"], "persisted");

        let response = send(
            &app,
            Method::PATCH,
            "/api/v1/session/field?owner=ada",
            Some(json!({ "path": "experience.0.jobTitle", "value": "Analyst" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["record"]["experience"][0]["jobTitle"], "Analyst");

        // Not persisted until saved.
        let listed = body_json(send(&app, Method::GET, "/api/v1/resumes?owner=ada", None).await).await;
        assert_eq!(listed[0]["experience"], json!([]));

        let response = send(&app, Method::POST, "/api/v1/session/save?owner=ada", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let listed = body_json(send(&app, Method::GET, "/api/v1/resumes?owner=ada", None).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["experience"][0]["jobTitle"], "Analyst");
    }

    #[tokio::test]
    async fn test_draft_is_appended_on_first_save() {
        let app = app();
        create(&app, "ada", "Ada").await;

        let response = send(
            &app,
            Method::POST,
            "/api/v1/session/draft?owner=ada",
            Some(json!({ "name": "Ada", "email": "ada@example.com" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["state"], "unsaved");
        assert_eq!(body["record"]["contact"]["name"], "Ada");

        let listed = body_json(send(&app, Method::GET, "/api/v1/resumes?owner=ada", None).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let response = send(&app, Method::POST, "/api/v1/session/save?owner=ada", None).await;
        assert_eq!(body_json(response).await["state"], "persisted");

        let listed = body_json(send(&app, Method::GET, "/api/v1/resumes?owner=ada", None).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_path_is_validation_error() {
        let app = app();
        let created = create(&app, "ada", "Ada").await;
        let id = created["id"].as_str().unwrap();
        send(&app, Method::POST, &format!("/api/v1/session/open/{id}?owner=ada"), None).await;

        let response = send(
            &app,
            Method::PATCH,
            "/api/v1/session/field?owner=ada",
            Some(json!({ "path": "contact.fax", "value": "555" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_session_edits_without_open_document_are_not_found() {
        let response = send(
            &app(),
            Method::PATCH,
            "/api/v1/session/field?owner=ada",
            Some(json!({ "path": "summary", "value": "Hello" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_responsibility_insert_and_remove() {
        let app = app();
        let created = create(&app, "ada", "Ada").await;
        let id = created["id"].as_str().unwrap();
        send(&app, Method::POST, &format!("/api/v1/session/open/{id}?owner=ada"), None).await;
        send(
            &app,
            Method::PATCH,
            "/api/v1/session/field?owner=ada",
            Some(json!({ "path": "experience.0.company", "value": "Acme" })),
        )
        .await;

        let response = send(
            &app,
            Method::POST,
            "/api/v1/session/responsibilities?owner=ada",
            Some(json!({ "action": "insert", "experience": 0, "position": 0, "text": "Shipped it" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["record"]["experience"][0]["responsibilities"],
            json!(["Shipped it"])
        );

        let response = send(
            &app,
            Method::POST,
            "/api/v1/session/responsibilities?owner=ada",
            Some(json!({ "action": "remove", "experience": 0, "position": 0 })),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["record"]["experience"][0]["responsibilities"], json!([]));
    }

    #[tokio::test]
    async fn test_duplicate_missing_is_not_found() {
        let response = send(
            &app(),
            Method::POST,
            &format!("/api/v1/resumes/{}/duplicate?owner=ada", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_appends_copy() {
        let app = app();
        let created = create(&app, "ada", "Ada").await;
        let id = created["id"].as_str().unwrap();

        let response = send(
            &app,
            Method::POST,
            &format!("/api/v1/resumes/{id}/duplicate?owner=ada"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let copy = body_json(response).await;
        assert_eq!(copy["versionName"], "My Resume (Copy)");
        assert_ne!(copy["id"], created["id"]);

        let listed = body_json(send(&app, Method::GET, "/api/v1/resumes?owner=ada", None).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_deleting_active_record_closes_session() {
        let app = app();
        let created = create(&app, "ada", "Ada").await;
        let id = created["id"].as_str().unwrap();
        send(&app, Method::POST, &format!("/api/v1/session/open/{id}?owner=ada"), None).await;

        let response = send(&app, Method::DELETE, &format!("/api/v1/resumes/{id}?owner=ada"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, Method::GET, "/api/v1/session?owner=ada", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Deleting again is a no-op.
        let response = send(&app, Method::DELETE, &format!("/api/v1/resumes/{id}?owner=ada"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let app = app();
        create(&app, "ada", "Ada").await;

        let listed = body_json(send(&app, Method::GET, "/api/v1/resumes?owner=grace", None).await).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn test_render_formats() {
        let app = app();
        let created = create(&app, "ada", "Ada Lovelace").await;
        let id = created["id"].as_str().unwrap();

        let response = send(&app, Method::GET, &format!("/api/v1/resumes/{id}/render?owner=ada"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["template"], "classic");
        assert_eq!(body["layout"]["kind"], "single_column");

        let response = send(
            &app,
            Method::GET,
            &format!("/api/v1/resumes/{id}/render?owner=ada&format=html"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Ada Lovelace"));

        let response = send(
            &app,
            Method::GET,
            &format!("/api/v1/resumes/{id}/render?owner=ada&format=pdf"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_render_includes_unsaved_edits() {
        let app = app();
        let created = create(&app, "ada", "Ada").await;
        let id = created["id"].as_str().unwrap();
        send(&app, Method::POST, &format!("/api/v1/session/open/{id}?owner=ada"), None).await;
        send(
            &app,
            Method::PATCH,
            "/api/v1/session/field?owner=ada",
            Some(json!({ "path": "template", "value": "creative" })),
        )
        .await;

        let response = send(&app, Method::GET, "/api/v1/session/render?owner=ada", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["layout"]["kind"], "sidebar");
    }

    #[tokio::test]
    async fn test_ai_routes_without_generator_are_unavailable() {
        let response = send(
            &app(),
            Method::POST,
            "/api/v1/ai/skills?owner=ada",
            Some(json!({ "jobTitle": "Backend Engineer", "existingSkills": [] })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"]["code"], "AI_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_ai_summary_with_generator() {
        let generator = Arc::new(ScriptedGenerator::replying(
            r#"{"summary": "  Seasoned engineer.  "}"#,
        ));
        let shared: Arc<dyn TextGenerator> = generator.clone();
        let app = app_with(Some(shared));

        let response = send(
            &app,
            Method::POST,
            "/api/v1/ai/summary?owner=ada",
            Some(json!({
                "experienceLevel": "senior",
                "jobTitle": "Backend Engineer",
                "skills": ["Rust"],
                "experienceSummary": "APIs"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["summary"], "Seasoned engineer.");
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ai_provider_failure_is_bad_gateway() {
        let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::failing(529));
        let app = app_with(Some(generator));
        let response = send(
            &app,
            Method::POST,
            "/api/v1/ai/summary?owner=ada",
            Some(json!({ "experienceLevel": "junior", "jobTitle": "Backend Engineer" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
