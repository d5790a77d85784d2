//! Test utilities for integration tests.
//!
//! Provides request signing independent of the library's own signer, a
//! router factory, a store double that always fails, and body helpers.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use sha2::Sha256;

use storefront_proxy::error::StoreError;
use storefront_proxy::store::{AddOutcome, NewSubscriber, Subscriber, SubscriberStore};
use storefront_proxy::{create_router, AppState, MemorySubscriberStore, RouterConfig};

pub const TEST_SECRET: &str = "shhh";

pub const TEST_SHOP: &str = "a.myshopify.com";

/// Hex HMAC-SHA256 of `payload`, computed directly with the hmac crate.
pub fn hmac_hex(secret: &str, payload: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Signature for `pairs` following the platform's scheme.
pub fn sign_pairs(secret: &str, pairs: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = pairs.to_vec();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    let canonical: String = sorted.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    hmac_hex(secret, &canonical)
}

/// Percent-encoded query string for `pairs` plus the given signature.
pub fn query_with_signature(pairs: &[(&str, &str)], signature: &str) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("signature", signature);
    serializer.finish()
}

/// `path?query` signed with [`TEST_SECRET`].
pub fn signed_uri(path: &str, pairs: &[(&str, &str)]) -> String {
    let signature = sign_pairs(TEST_SECRET, pairs);
    format!("{}?{}", path, query_with_signature(pairs, &signature))
}

/// Typical proxy parameters for an anonymous visitor.
pub fn shop_params() -> Vec<(&'static str, &'static str)> {
    vec![
        ("shop", TEST_SHOP),
        ("path_prefix", "/apps/news"),
        ("timestamp", "1700000000"),
    ]
}

pub fn test_config() -> RouterConfig {
    RouterConfig::new(TEST_SECRET).with_tracing(false)
}

pub fn test_router() -> Router {
    create_router(AppState::new(MemorySubscriberStore::new()), test_config())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

pub fn post_form(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Store Doubles
// =============================================================================

/// Store whose every operation fails, for error-path tests.
pub struct FailingStore;

#[async_trait]
impl SubscriberStore for FailingStore {
    async fn add(&self, _subscriber: NewSubscriber) -> Result<AddOutcome, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn list(&self) -> Result<Vec<Subscriber>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
