//! OpenSASE Forms API
//!
//! REST surface over the form builder core: form CRUD, rendering in edit or
//! fill mode, dry-run validation and public submissions.
//!
//! | Method | Path                          | Purpose                     |
//! |--------|-------------------------------|-----------------------------|
//! | GET    | `/health`                     | liveness                    |
//! | GET    | `/api/forms`                  | forms of the calling actor  |
//! | POST   | `/api/forms`                  | create                      |
//! | GET    | `/api/forms/:id`              | fetch                       |
//! | PUT    | `/api/forms/:id`              | replace schema              |
//! | DELETE | `/api/forms/:id`              | delete                      |
//! | GET    | `/api/forms/:id/render?mode=` | presentation tree           |
//! | POST   | `/api/forms/:id/validate`     | validate answers            |
//! | POST   | `/api/forms/:id/submissions`  | submit answers              |

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use forms_core::{
    AnalyticsSink, FormRepository, FormService, FormUseCases, FormsConfig, SubmissionGateway,
};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use models::*;

/// API state
pub struct ApiState {
    pub forms: Arc<dyn FormUseCases>,
    pub started_at: Instant,
}

impl ApiState {
    pub fn new(forms: Arc<dyn FormUseCases>) -> Self {
        Self { forms, started_at: Instant::now() }
    }

    /// Wire a `FormService` over the given collaborators
    pub fn with_service(
        repository: Arc<dyn FormRepository>,
        submissions: Arc<dyn SubmissionGateway>,
        analytics: Arc<dyn AnalyticsSink>,
        config: &FormsConfig,
    ) -> Self {
        Self::new(Arc::new(FormService::new(repository, submissions, analytics, config)))
    }
}

/// Build the API router
pub fn build_router(state: ApiState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/forms", routes::forms::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(Arc::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use forms_core::infrastructure::{InMemoryFormRepository, InMemorySubmissionStore, NoOpAnalytics};
    use serde_json::{json, Value};

    fn server() -> (TestServer, Arc<InMemorySubmissionStore>) {
        let submissions = Arc::new(InMemorySubmissionStore::new());
        let state = ApiState::with_service(
            Arc::new(InMemoryFormRepository::new()),
            submissions.clone(),
            Arc::new(NoOpAnalytics),
            &FormsConfig::default(),
        );
        (TestServer::new(build_router(state, 64 * 1024)).unwrap(), submissions)
    }

    fn actor(id: &'static str) -> (HeaderName, HeaderValue) {
        (HeaderName::from_static("x-actor-id"), HeaderValue::from_static(id))
    }

    fn contact() -> Value {
        json!({
            "title": "Contact",
            "fields": [
                {"id": "name", "type": "text", "label": "Name", "required": true},
                {"id": "email", "type": "email", "label": "Email", "required": true},
                {"id": "topic", "type": "select", "label": "Topic", "options": ["Sales", "Support"]}
            ]
        })
    }

    async fn create(server: &TestServer) -> String {
        let (name, value) = actor("ann");
        let response = server.post("/api/forms").add_header(name, value).json(&contact()).await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (server, _) = server();
        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "forms-api");
    }

    #[tokio::test]
    async fn test_malformed_body_uses_envelope() {
        let (server, _) = server();
        let (name, value) = actor("ann");
        let response = server
            .post("/api/forms")
            .add_header(name, value)
            .bytes("{\"title\": ".into())
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "bad_request");

        let id = create(&server).await;
        let response = server
            .get(&format!("/api/forms/{}/render", id))
            .add_query_param("mode", "preview")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn test_fill_render_starts_from_defaults() {
        let (server, _) = server();
        let (name, value) = actor("ann");
        let schema = json!({
            "title": "Trip",
            "fields": [{"id": "city", "type": "text", "label": "City", "required": true, "defaultValue": "Berlin"}]
        });
        let response = server.post("/api/forms").add_header(name, value).json(&schema).await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["data"]["id"].as_str().unwrap().to_string();

        let fill: Value = server.get(&format!("/api/forms/{}/render", id)).await.json();
        assert_eq!(fill["data"]["submit"]["disabled"], false);
        assert_eq!(fill["data"]["layout"]["items"][0]["field"]["widget"]["value"], "Berlin");
    }

    #[tokio::test]
    async fn test_create_requires_actor() {
        let (server, _) = server();
        let response = server.post("/api/forms").json(&contact()).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"]["code"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_crud_flow() {
        let (server, _) = server();
        let id = create(&server).await;

        let response = server.get(&format!("/api/forms/{}", id)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["schema"]["fields"][2]["options"][1], json!({"label": "Support", "value": "Support"}));

        let (name, value) = actor("ann");
        let listed: Value = server.get("/api/forms").add_header(name, value).await.json();
        assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));

        let (name, value) = actor("bob");
        let response = server.delete(&format!("/api/forms/{}", id)).add_header(name, value).await;
        response.assert_status(StatusCode::FORBIDDEN);

        let (name, value) = actor("ann");
        server.delete(&format!("/api/forms/{}", id)).add_header(name, value).await.assert_status(StatusCode::NO_CONTENT);
        server.get(&format!("/api/forms/{}", id)).await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_title_is_conflict() {
        let (server, _) = server();
        create(&server).await;

        let (name, value) = actor("bob");
        let response = server.post("/api/forms").add_header(name, value).json(&contact()).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["error"]["message"], "a form with this title already exists");
    }

    #[tokio::test]
    async fn test_admin_may_update_foreign_form() {
        let (server, _) = server();
        let id = create(&server).await;
        let mut schema = contact();
        schema["title"] = json!("Contact us");

        let (name, value) = actor("root");
        let response = server
            .put(&format!("/api/forms/{}", id))
            .add_header(name, value)
            .add_header(HeaderName::from_static("x-actor-admin"), HeaderValue::from_static("true"))
            .json(&schema)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["ownerId"], "ann");
    }

    #[tokio::test]
    async fn test_render_modes() {
        let (server, _) = server();
        let id = create(&server).await;

        let fill: Value = server.get(&format!("/api/forms/{}/render", id)).await.json();
        assert_eq!(fill["data"]["mode"], "fill");
        assert_eq!(fill["data"]["submit"]["disabled"], true);
        assert_eq!(fill["data"]["layout"]["items"][0]["field"]["interactive"], true);

        let edit: Value = server
            .get(&format!("/api/forms/{}/render", id))
            .add_query_param("mode", "edit")
            .await
            .json();
        assert_eq!(edit["data"]["layout"]["items"][0]["field"]["interactive"], false);
    }

    #[tokio::test]
    async fn test_validate_endpoint() {
        let (server, _) = server();
        let id = create(&server).await;

        let response = server
            .post(&format!("/api/forms/{}/validate", id))
            .json(&json!({"answers": {"email": "ann@x.com"}}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["valid"], false);
        assert_eq!(body["data"]["errors"], json!({"name": "Name is required"}));
    }

    #[tokio::test]
    async fn test_submission_with_embed_identity() {
        let (server, submissions) = server();
        let id = create(&server).await;

        let response = server
            .post(&format!("/api/forms/{}/submissions", id))
            .add_query_param("userId", "u-1")
            .add_query_param("campaign", "spring")
            .json(&json!({"answers": {"name": "Ann", "email": "ann@x.com"}}))
            .await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["data"]["status"], "accepted");

        let stored = submissions.for_form(&forms_core::FormId::from_string(id.clone()));
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].metadata["userId"], "u-1");
        assert_eq!(stored[0].metadata["campaign"], "spring");

        let response = server
            .post(&format!("/api/forms/{}/submissions", id))
            .json(&json!({"answers": {"email": "ann@x.com"}}))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "rejected");
        assert_eq!(body["data"]["report"]["errors"]["name"], "Name is required");
    }
}
