//! Newsletter signup integration tests.
//!
//! Tests verify:
//! - JSON and form-encoded signups are accepted once per email
//! - Duplicates come back as `success: false`, not an HTTP error
//! - Validation and content-type failures map to 400 and 415
//! - Store failures map to 500 without leaking details
//! - Concurrent signups for one email store exactly one record

use std::sync::Arc;

use axum::http::StatusCode;
use tower::ServiceExt;

use storefront_proxy::{
    create_router, AppState, Catalog, MemorySubscriberStore, SubscriberStore,
};

use super::test_utils::{
    body_json, body_string, get, post_form, post_json, shop_params, signed_uri, test_config,
    test_router, FailingStore, TEST_SHOP,
};

fn subscribe_uri() -> String {
    signed_uri("/proxy/subscribe", &shop_params())
}

// =============================================================================
// Accepted and Duplicate Signups
// =============================================================================

#[tokio::test]
async fn test_subscribe_then_duplicate() {
    let router = test_router();
    let body = r#"{"name":"Jo","email":"jo@x.com"}"#;

    let first = router
        .clone()
        .oneshot(post_json(&subscribe_uri(), body))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let json = body_json(first).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Thank you for subscribing!");

    let second = router
        .oneshot(post_json(&subscribe_uri(), body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let json = body_json(second).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "This email is already subscribed!");
}

#[tokio::test]
async fn test_duplicate_detection_ignores_case_and_whitespace() {
    let router = test_router();

    let first = router
        .clone()
        .oneshot(post_json(
            &subscribe_uri(),
            r#"{"name":"Jo","email":"jo@x.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(first).await["success"], true);

    let second = router
        .oneshot(post_json(
            &subscribe_uri(),
            r#"{"name":"Jo","email":"  JO@X.com "}"#,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(second).await["success"], false);
}

#[tokio::test]
async fn test_subscribe_with_form_body() {
    let response = test_router()
        .oneshot(post_form(&subscribe_uri(), "name=Jo+Smith&email=jo%40x.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn test_subscriber_records_shop_and_customer() {
    let store = Arc::new(MemorySubscriberStore::new());
    let state = AppState::from_shared(Arc::clone(&store), Catalog::default());
    let router = create_router(state, test_config());

    let pairs = [
        ("shop", TEST_SHOP),
        ("logged_in", "true"),
        ("customer_id", "77"),
    ];
    let response = router
        .oneshot(post_json(
            &signed_uri("/proxy/subscribe", &pairs),
            r#"{"name":"Jo","email":"jo@x.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let subscribers = store.list().await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].name, "Jo");
    assert_eq!(subscribers[0].email, "jo@x.com");
    assert_eq!(subscribers[0].shop.as_deref(), Some(TEST_SHOP));
    assert_eq!(subscribers[0].customer_id.as_deref(), Some("77"));
}

// =============================================================================
// Rejected Signups
// =============================================================================

#[tokio::test]
async fn test_missing_fields_rejected() {
    for body in [
        r#"{"email":"jo@x.com"}"#,
        r#"{"name":"Jo"}"#,
        r#"{"name":"","email":"jo@x.com"}"#,
        r#"{}"#,
    ] {
        let response = test_router()
            .oneshot(post_json(&subscribe_uri(), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);

        let json = body_json(response).await;
        assert_eq!(json["error"], "missing_field");
    }
}

#[tokio::test]
async fn test_invalid_email_rejected() {
    let response = test_router()
        .oneshot(post_json(
            &subscribe_uri(),
            r#"{"name":"Jo","email":"not-an-email"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_email");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let response = test_router()
        .oneshot(post_json(&subscribe_uri(), "{\"name\":"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "malformed_body");
}

#[tokio::test]
async fn test_unsupported_content_type_rejected() {
    let request = axum::http::Request::builder()
        .method("POST")
        .uri(subscribe_uri())
        .header("content-type", "text/plain")
        .body(axum::body::Body::from("name=Jo&email=jo@x.com"))
        .unwrap();

    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_rejected_signup_is_not_stored() {
    let store = Arc::new(MemorySubscriberStore::new());
    let state = AppState::from_shared(Arc::clone(&store), Catalog::default());
    let router = create_router(state, test_config());

    let response = router
        .oneshot(post_json(&subscribe_uri(), r#"{"name":"Jo","email":"jo"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let router = create_router(AppState::new(FailingStore), test_config());

    let response = router
        .oneshot(post_json(
            &subscribe_uri(),
            r#"{"name":"Jo","email":"jo@x.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "store_unavailable");
    assert!(!json["message"].as_str().unwrap().contains("connection refused"));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signups_store_one_record() {
    let store = Arc::new(MemorySubscriberStore::new());
    let state = AppState::from_shared(Arc::clone(&store), Catalog::default());
    let router = create_router(state, test_config());

    let mut handles = Vec::new();
    for _ in 0..32 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let response = router
                .oneshot(post_json(
                    &subscribe_uri(),
                    r#"{"name":"Jo","email":"jo@x.com"}"#,
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            body_json(response).await["success"] == true
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(store.len().await, 1);
}

// =============================================================================
// Signup Form
// =============================================================================

#[tokio::test]
async fn test_signup_form_posts_through_storefront_prefix() {
    let response = test_router().oneshot(get(&subscribe_uri())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("action=\"/apps/news/subscribe\""));
}
