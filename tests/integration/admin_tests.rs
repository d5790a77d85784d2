//! Health and admin route integration tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use storefront_proxy::{create_router, AppState, MemorySubscriberStore};

use super::test_utils::{
    body_json, get, post_json, shop_params, signed_uri, test_config, test_router, FailingStore,
};

const ADMIN_TOKEN: &str = "operator-token";

fn admin_router() -> Router {
    create_router(
        AppState::new(MemorySubscriberStore::new()),
        test_config().with_admin_token(ADMIN_TOKEN),
    )
}

fn admin_request(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/admin/subscribers");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let response = test_router().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "OK");

    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(timestamp.ends_with('Z'));
}

#[tokio::test]
async fn test_health_ignores_signature_parameters() {
    let response = test_router()
        .oneshot(get("/health?signature=bogus"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_not_mounted_without_token() {
    let response = test_router()
        .oneshot(admin_request(Some("Bearer anything")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_requires_bearer_token() {
    for authorization in [
        None,
        Some("Bearer wrong-token"),
        Some("operator-token"),
        Some("bearer operator-token"),
    ] {
        let response = admin_router()
            .oneshot(admin_request(authorization))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{:?}",
            authorization
        );
        assert_eq!(
            response.headers().get("www-authenticate").unwrap(),
            "Bearer"
        );
    }
}

#[tokio::test]
async fn test_admin_lists_subscribers() {
    let router = admin_router();

    for body in [
        r#"{"name":"Jo","email":"jo@x.com"}"#,
        r#"{"name":"Sam","email":"sam@x.com"}"#,
        r#"{"name":"Jo again","email":"JO@x.com"}"#,
    ] {
        let response = router
            .clone()
            .oneshot(post_json(
                &signed_uri("/proxy/subscribe", &shop_params()),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let bearer = format!("Bearer {}", ADMIN_TOKEN);
    let response = router
        .oneshot(admin_request(Some(&bearer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total"], 2);

    let subscribers = json["subscribers"].as_array().unwrap();
    assert_eq!(subscribers[0]["name"], "Jo");
    assert_eq!(subscribers[0]["email"], "jo@x.com");
    assert_eq!(subscribers[0]["shop"], "a.myshopify.com");
    assert_eq!(subscribers[1]["name"], "Sam");
    assert!(subscribers[1]["created_at"].is_string());
}

#[tokio::test]
async fn test_admin_store_failure() {
    let router = create_router(
        AppState::new(FailingStore),
        test_config().with_admin_token(ADMIN_TOKEN),
    );

    let bearer = format!("Bearer {}", ADMIN_TOKEN);
    let response = router
        .oneshot(admin_request(Some(&bearer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_admin_does_not_accept_proxy_signature() {
    let response = admin_router()
        .oneshot(get(&signed_uri("/admin/subscribers", &shop_params())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
