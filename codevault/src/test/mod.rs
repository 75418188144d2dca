use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use crate::{
    Application,
    api::models::{auth::AuthResponse, pagination::PaginatedResponse, snippets::SnippetResponse, users::UserResponse},
    errors::ErrorBody,
    test_utils::{bearer, create_test_config},
};

async fn create_test_server(pool: PgPool) -> axum_test::TestServer {
    Application::with_pool(create_test_config(), pool)
        .await
        .expect("Failed to create application")
        .into_test_server()
}

/// End-to-end: register, create a snippet, edit it, and check what other users can see.
#[sqlx::test]
#[test_log::test]
async fn test_e2e_snippet_lifecycle(pool: PgPool) {
    let server = create_test_server(pool).await;

    let alice: AuthResponse = server
        .post("/api/auth/register")
        .json(&json!({ "username": "alice", "password": "pw12345678" }))
        .await
        .json();
    assert!(!alice.token.is_empty());
    assert_eq!(alice.display_name, "alice");
    let (alice_header, alice_value) = bearer(&alice.token);

    let created = server
        .post("/api/snippets")
        .add_header(alice_header.clone(), alice_value.clone())
        .json(&json!({ "title": "x", "code": "print(1)", "language": "python" }))
        .await;
    created.assert_status_ok();
    let created: SnippetResponse = created.json();
    assert_eq!(created.version, 1);
    assert_eq!(created.user_id, alice.user_id);
    assert!(!created.is_public);

    let updated: SnippetResponse = server
        .patch(&format!("/api/snippets/{}", created.id))
        .add_header(alice_header.clone(), alice_value.clone())
        .json(&json!({ "title": "renamed", "tags": ["a", "b"] }))
        .await
        .json();
    assert_eq!(updated.title, "renamed");
    assert_eq!(updated.tags, vec!["a", "b"]);
    assert_eq!(updated.version, created.version);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.code, "print(1)");

    // A second user cannot see the private snippet
    let bob: AuthResponse = server
        .post("/api/auth/register")
        .json(&json!({ "username": "bob", "password": "pw12345678" }))
        .await
        .json();
    let (bob_header, bob_value) = bearer(&bob.token);

    server
        .get(&format!("/api/snippets/{}", created.id))
        .add_header(bob_header.clone(), bob_value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let public: PaginatedResponse<SnippetResponse> = server.get("/api/snippets/public").await.json();
    assert_eq!(public.total_count, 0);

    // Publishing makes it readable by anyone, but still only editable by the owner
    server
        .put(&format!("/api/snippets/{}", created.id))
        .add_header(alice_header.clone(), alice_value.clone())
        .json(&json!({ "isPublic": true }))
        .await
        .assert_status_ok();

    let seen: SnippetResponse = server
        .get(&format!("/api/snippets/{}", created.id))
        .add_header(bob_header.clone(), bob_value.clone())
        .await
        .json();
    assert_eq!(seen.view_count, 1);

    server
        .patch(&format!("/api/snippets/{}", created.id))
        .add_header(bob_header, bob_value)
        .json(&json!({ "title": "mine now" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let public: PaginatedResponse<SnippetResponse> = server.get("/api/snippets/public").await.json();
    assert_eq!(public.total_count, 1);
    assert_eq!(public.data[0].title, "renamed");

    let copied: SnippetResponse = server.post(&format!("/api/snippets/{}/copy", created.id)).await.json();
    assert_eq!(copied.copy_count, 1);

    let mine: PaginatedResponse<SnippetResponse> = server
        .get("/api/snippets")
        .add_header(alice_header.clone(), alice_value.clone())
        .await
        .json();
    assert_eq!(mine.total_count, 1);

    let profile: UserResponse = server.get("/api/users/me").add_header(alice_header, alice_value).await.json();
    assert_eq!(profile.username, "alice");
}

#[sqlx::test]
#[test_log::test]
async fn test_duplicate_registration_rejected(pool: PgPool) {
    let server = create_test_server(pool).await;

    server
        .post("/api/auth/register")
        .json(&json!({ "username": "alice", "password": "pw12345678" }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "username": "alice", "password": "another-password" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"], crate::errors::DUPLICATE_USERNAME_MESSAGE);
}

#[sqlx::test]
#[test_log::test]
async fn test_protected_routes_require_token(pool: PgPool) {
    let server = create_test_server(pool).await;

    server.get("/api/snippets").await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/snippets")
        .json(&json!({ "title": "x", "code": "y", "language": "z" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server.get("/api/users/me").await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/snippets/public")
        .add_header(axum::http::header::AUTHORIZATION, "Bearer garbage")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
#[test_log::test]
async fn test_health_and_docs_endpoints(pool: PgPool) {
    let server = create_test_server(pool).await;

    let health = server.get("/healthz").await;
    health.assert_status_ok();
    health.assert_text("OK");

    let spec = server.get("/api-docs/openapi.json").await;
    spec.assert_status_ok();
    let spec = spec.json::<serde_json::Value>();
    assert!(spec["paths"]["/api/snippets/{id}"].is_object());
    assert!(spec["components"]["securitySchemes"]["bearer_auth"].is_object());

    server.get("/docs").await.assert_status_ok();
}

#[sqlx::test]
#[test_log::test]
async fn test_metrics_endpoint_when_enabled(pool: PgPool) {
    let mut config = create_test_config();
    config.enable_metrics = true;
    let server = Application::with_pool(config, pool)
        .await
        .expect("Failed to create application")
        .into_test_server();

    server.get("/healthz").await.assert_status_ok();
    server.get("/internal/metrics").await.assert_status_ok();
}

/// Extractor failures come back as 400 with the usual `{ "error": .. }` body.
#[sqlx::test]
#[test_log::test]
async fn test_malformed_requests_return_json_errors(pool: PgPool) {
    let server = create_test_server(pool).await;

    let assert_json_bad_request = |response: axum_test::TestResponse| {
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = serde_json::from_str(&response.text()).expect("error body is JSON");
        assert!(!body.error.is_empty());
        body
    };

    let body = assert_json_bad_request(server.post("/api/auth/register").json(&json!({ "username": "alice" })).await);
    assert!(body.error.contains("password"), "{}", body.error);

    assert_json_bad_request(server.post("/api/auth/login").text("username=alice").await);

    assert_json_bad_request(server.get("/api/snippets/abc").await);
    assert_json_bad_request(server.post("/api/snippets/abc/copy").await);

    assert_json_bad_request(server.get("/api/snippets/public").add_query_param("favorite", "maybe").await);
    assert_json_bad_request(server.get("/api/snippets/public").add_query_param("limit", "ten").await);
}
