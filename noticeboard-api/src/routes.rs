//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Public feed
        .route("/api/announcements", get(handlers::list_announcements))

        // Admin
        .route("/api/admin/validate", post(handlers::validate_admin))
        .route("/api/admin/announcements", post(handlers::create_announcement))
        .route(
            "/api/admin/announcements/:id",
            patch(handlers::update_announcement).delete(handlers::delete_announcement),
        )

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use noticeboard_core::error::{BoardError, Result};
    use noticeboard_core::traits::CollectionBackend;
    use noticeboard_core::types::Announcement;
    use noticeboard_store::{AnnouncementStore, MemoryBackend};

    use crate::state::ApiConfig;

    const TOKEN: &str = "abc";

    fn store() -> Arc<AnnouncementStore> {
        Arc::new(AnnouncementStore::new(Arc::new(MemoryBackend::new())))
    }

    fn app_with(admin_token: Option<&str>, store: Arc<AnnouncementStore>) -> Router {
        let config = ApiConfig {
            admin_token: admin_token.map(str::to_string),
            ..ApiConfig::default()
        };
        create_router(Arc::new(AppState::with_store(config, store)))
    }

    fn test_app() -> Router {
        app_with(Some(TOKEN), store())
    }

    fn request(method: Method, uri: &str, auth: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn admin(method: Method, uri: &str, body: Option<&str>) -> Request<Body> {
        request(method, uri, Some("Bearer abc"), body)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn create(app: &Router, body: Value) -> Value {
        let (status, entry) = send(
            app,
            admin(Method::POST, "/api/admin/announcements", Some(&body.to_string())),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        entry
    }

    fn error_code(body: &Value) -> &str {
        body["error"]["code"].as_str().unwrap()
    }

    fn error_message(body: &Value) -> &str {
        body["error"]["message"].as_str().unwrap()
    }

    struct BrokenBackend;

    #[async_trait]
    impl CollectionBackend for BrokenBackend {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn load(&self) -> Result<Vec<Announcement>> {
            Err(BoardError::HttpError("connection refused".into()))
        }

        async fn save(&self, _records: &[Announcement]) -> Result<()> {
            Err(BoardError::HttpError("connection refused".into()))
        }
    }

    struct ReadOnlyBackend;

    #[async_trait]
    impl CollectionBackend for ReadOnlyBackend {
        fn name(&self) -> &'static str {
            "read-only"
        }

        async fn load(&self) -> Result<Vec<Announcement>> {
            Ok(Vec::new())
        }

        async fn save(&self, _records: &[Announcement]) -> Result<()> {
            Err(BoardError::KvError {
                status: 403,
                message: "NOPERM".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app();
        let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["announcements_count"], 0);
        assert_eq!(body["backend"], "memory");
        assert_eq!(body["fallback_writes"], 0);
        assert_eq!(body["admin_configured"], true);
    }

    #[tokio::test]
    async fn test_public_feed_starts_empty() {
        let app = test_app();
        let (status, body) = send(&app, request(Method::GET, "/api/announcements", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"announcements": []}));
    }

    #[tokio::test]
    async fn test_validate_token() {
        let app = test_app();

        let (status, body) = send(&app, admin(Method::POST, "/api/admin/validate", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));

        let (status, body) = send(
            &app,
            request(Method::POST, "/api/admin/validate", Some("Bearer abcd"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body), "UNAUTHORIZED");

        let (status, _) = send(&app, request(Method::POST, "/api/admin/validate", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_admin_token_is_server_error() {
        let app = app_with(None, store());
        let (status, body) = send(&app, admin(Method::POST, "/api/admin/validate", None)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_code(&body), "SERVER_MISCONFIGURED");
        assert_eq!(error_message(&body), "Server misconfiguration: missing ADMIN_TOKEN");
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let app = test_app();
        let entry = create(&app, json!({"title": " Maintenance ", "body": "Down at 2AM"})).await;

        assert_eq!(entry["title"], "Maintenance");
        assert_eq!(entry["highlight"], false);
        assert!(entry["id"].as_str().is_some());
        assert!(entry["publishedAt"].as_str().unwrap().ends_with('Z'));

        let (_, body) = send(&app, request(Method::GET, "/api/announcements", None, None)).await;
        assert_eq!(body["announcements"], json!([entry]));
    }

    #[tokio::test]
    async fn test_feed_is_newest_first() {
        let app = test_app();
        create(&app, json!({"title": "old", "body": "b", "publishedAt": "2023-01-01T00:00:00Z"})).await;
        create(&app, json!({"title": "new", "body": "b", "publishedAt": "2024-01-01T00:00:00Z"})).await;
        create(&app, json!({"title": "mid", "body": "b", "publishedAt": "2023-06-01T00:00:00Z"})).await;

        let (_, body) = send(&app, request(Method::GET, "/api/announcements", None, None)).await;
        let titles: Vec<_> = body["announcements"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_create_rejections() {
        let app = test_app();
        let uri = "/api/admin/announcements";

        let (status, body) = send(&app, admin(Method::POST, uri, Some("{not json"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&body), "Invalid JSON payload");

        let (status, body) = send(&app, admin(Method::POST, uri, Some(r#"{"title":"t"}"#))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(&body), "title and body are required");

        let (status, body) = send(&app, admin(Method::POST, uri, Some(r#"{"title":" ","body":"b"}"#))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(&body), "title and body cannot be empty");

        let (status, body) = send(
            &app,
            admin(Method::POST, uri, Some(r#"{"title":"t","body":"b","publishedAt":"nope"}"#)),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(&body), "publishedAt must be a valid ISO date string");

        let (_, body) = send(&app, request(Method::GET, "/api/announcements", None, None)).await;
        assert_eq!(body, json!({"announcements": []}));
    }

    #[tokio::test]
    async fn test_gate_runs_before_body_parsing() {
        let app = test_app();
        let (status, _) = send(
            &app,
            request(Method::POST, "/api/admin/announcements", Some("Bearer wrong"), Some("{not json")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/admin/announcements",
                None,
                Some(r#"{"title":"t","body":"b"}"#),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, body) = send(&app, request(Method::GET, "/api/announcements", None, None)).await;
        assert_eq!(body, json!({"announcements": []}));
    }

    #[tokio::test]
    async fn test_update_lifecycle() {
        let app = test_app();
        let entry = create(&app, json!({"title": "Maintenance", "body": "System down 2AM-3AM"})).await;
        let uri = format!("/api/admin/announcements/{}", entry["id"].as_str().unwrap());

        let (status, updated) = send(&app, admin(Method::PATCH, &uri, Some(r#"{"highlight":true}"#))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["highlight"], true);
        assert_eq!(updated["title"], "Maintenance");
        assert_eq!(updated["publishedAt"], entry["publishedAt"]);

        let (status, body) = send(&app, admin(Method::PATCH, &uri, Some("{}"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(&body), "At least one field must be provided");

        let (status, body) = send(&app, admin(Method::PATCH, &uri, Some("[]"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(&body), "Payload must be an object");

        let (status, body) = send(&app, admin(Method::PATCH, &uri, Some(r#"{"highlight":"yes"}"#))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(&body), "highlight must be a boolean");
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let app = test_app();
        let (status, body) = send(
            &app,
            admin(Method::PATCH, "/api/admin/announcements/missing", Some(r#"{"title":"x"}"#)),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_message(&body), "Not found");
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let app = test_app();
        let entry = create(&app, json!({"title": "t", "body": "b"})).await;
        let uri = format!("/api/admin/announcements/{}", entry["id"].as_str().unwrap());

        let (status, body) = send(&app, admin(Method::DELETE, &uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));

        let (status, _) = send(&app, admin(Method::DELETE, &uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, request(Method::DELETE, &uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let broken = Arc::new(AnnouncementStore::new(Arc::new(BrokenBackend)));
        let app = app_with(Some(TOKEN), broken);

        let (status, body) = send(&app, request(Method::GET, "/api/announcements", None, None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_code(&body), "STORAGE_ERROR");
        assert!(!error_message(&body).contains("connection refused"));

        let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["announcements_count"], Value::Null);
    }

    #[tokio::test]
    async fn test_fallback_write_shows_on_health() {
        let store = Arc::new(
            AnnouncementStore::new(Arc::new(MemoryBackend::new()))
                .with_durable(Arc::new(ReadOnlyBackend)),
        );
        let app = app_with(Some(TOKEN), store);

        create(&app, json!({"title": "t", "body": "b"})).await;

        let (_, body) = send(&app, request(Method::GET, "/health", None, None)).await;
        assert_eq!(body["backend"], "read-only -> memory");
        assert_eq!(body["fallback_writes"], 1);
        assert_eq!(body["last_divergence"]["operation"], "create");
        assert_eq!(body["last_divergence"]["fallback_backend"], "memory");
    }
}
