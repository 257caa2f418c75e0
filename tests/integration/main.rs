//! Integration tests for the route admin panel.
//!
//! These drive the web panel end to end: router, controller and a backend,
//! either the in-memory one or the HTTP client against a local stub server.
//! Run with: cargo test --test integration

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mock_route_admin::client::{HttpRouteApi, KeyStore, MockConfig, MockRouteApi, RouteApi};
use mock_route_admin::config::Config;
use mock_route_admin::controller::AdminController;
use mock_route_admin::model::RouteDraft;
use mock_route_admin::web::{create_router, AppState};

async fn send<A: RouteApi + 'static>(state: &AppState<A>, request: Request<Body>) -> Response {
    create_router(state.clone()).oneshot(request).await.unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn route_json(id: u64, path: &str) -> serde_json::Value {
    json!({
        "id": id,
        "path": path,
        "methods": ["GET", "POST"],
        "response": {"users": []},
        "status_code": 200,
        "headers": {"Content-Type": "application/json"},
        "delay": 0,
        "description": "stub route",
        "is_active": true,
        "created_at": "2024-05-01T12:00:00",
        "updated_at": "2024-05-01T12:00:00"
    })
}

#[tokio::test]
async fn web_panel_over_http_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_manage/routes"))
        .and(header_eq("X-API-Key", "mock-server-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [route_json(7, "/api/users")],
            "total": 1,
            "pages": 1,
            "current_page": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_manage/routes"))
        .and(body_partial_json(json!({"path": "/api/orders", "status_code": 201})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Route created successfully",
            "route": route_json(8, "/api/orders")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        base_url: format!("{}/_manage", server.uri()),
        ..Config::default()
    };
    let api = HttpRouteApi::new(&config, "mock-server-admin").unwrap();
    let state = AppState::new(AdminController::new(api, &config));

    let html = body_text(send(&state, get_req("/routes")).await).await;
    assert!(html.contains("/api/users"));
    assert!(html.contains("method-badge method-post"));
    assert!(html.contains("Page 1 / 1"));

    let created = send(
        &state,
        post_form(
            "/create",
            "path=%2Fapi%2Forders&methods=POST&status_code=201&delay=0&response=%7B%7D&is_active=on",
        ),
    )
    .await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);

    let html = body_text(send(&state, get_req("/routes")).await).await;
    assert!(html.contains("class=\"alert alert-success\""));
}

#[tokio::test]
async fn saved_key_unlocks_backend() {
    let dir = tempfile::tempdir().unwrap();
    let key_file = dir.path().join("route-admin.json");

    let api = MockRouteApi::with_config(MockConfig {
        required_api_key: Some("s3cret".to_string()),
        ..MockConfig::default()
    });
    api.seed(RouteDraft::new("/secure", json!({"ok": true})));

    let controller = AdminController::new(api.clone(), &Config::default())
        .with_key_store(KeyStore::new(&key_file));
    let state = AppState::new(controller);

    // The default key is rejected.
    let html = body_text(send(&state, get_req("/routes")).await).await;
    assert!(html.contains("class=\"alert alert-error\""));
    assert!(!html.contains("class=\"route-card"));

    let saved = send(&state, post_form("/api-key", "api_key=+s3cret+")).await;
    assert_eq!(saved.status(), StatusCode::SEE_OTHER);
    assert_eq!(KeyStore::new(&key_file).load().unwrap().as_deref(), Some("s3cret"));

    let html = body_text(send(&state, get_req("/routes")).await).await;
    assert!(html.contains("/secure"));
}

#[tokio::test]
async fn deleting_last_route_of_last_page_walks_back() {
    let api = MockRouteApi::new();
    api.seed_many(11);
    let state = AppState::new(AdminController::new(api.clone(), &Config::default()));

    send(&state, get_req("/routes?search=&active_only=true")).await;
    let html = body_text(send(&state, get_req("/routes?page=2")).await).await;
    assert!(html.contains("Page 2 / 2"));
    // Newest first, so the oldest route is alone on page 2.
    assert!(html.contains("data-route-id=\"1\""));

    let prompt = body_text(send(&state, get_req("/routes/1/delete")).await).await;
    assert!(prompt.contains("delete-confirmation"));
    let confirmed = send(&state, post_form("/confirmations/1", "decision=confirm")).await;
    assert_eq!(confirmed.status(), StatusCode::SEE_OTHER);

    let html = body_text(send(&state, get_req("/routes")).await).await;
    assert!(html.contains("Page 1 / 1"));
    assert!(!html.contains("data-route-id=\"1\""));
    assert!(html.contains("data-route-id=\"11\""));
}

#[tokio::test]
async fn offline_backend_keeps_panel_usable() {
    let api = MockRouteApi::new();
    api.seed_many(3);
    let state = AppState::new(AdminController::new(api.clone(), &Config::default()));

    let html = body_text(send(&state, get_req("/routes")).await).await;
    assert_eq!(html.matches("class=\"route-card").count(), 3);

    api.set_offline(true);
    let toggled = send(&state, post_form("/routes/2/toggle", "")).await;
    assert_eq!(toggled.status(), StatusCode::SEE_OTHER);

    let health = send(&state, get_req("/health")).await;
    assert_eq!(health.status(), StatusCode::OK);
    let html = body_text(health).await;
    assert!(html.contains("class=\"alert alert-error\""));

    api.set_offline(false);
    let html = body_text(send(&state, get_req("/routes")).await).await;
    assert!(html.contains("class=\"route-card"));
    assert!(api.routes().iter().all(|r| r.is_active));
}
