//! HTTP request handlers for the storefront proxy.
//!
//! # Endpoints
//!
//! - `GET /proxy`, `GET /proxy/` and `GET /proxy/{*subpath}` - Home page (default)
//! - `POST /proxy`, `POST /proxy/` and `POST /proxy/{*subpath}` - Generic form submission
//! - `GET /proxy/news` - News listing
//! - `GET /proxy/products` - Product listing
//! - `GET /proxy/subscribe` - Newsletter signup form
//! - `POST /proxy/subscribe` - Newsletter signup
//! - `GET /admin/subscribers` - Subscriber dump (operator token required)
//! - `GET /health` - Health check
//!
//! Every `/proxy` handler takes a [`ProxyContext`], which only exists once the
//! proxy guard has verified the request.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::form_urlencoded;

use crate::content::{render, Catalog};
use crate::error::{StoreError, SubscribeError};
use crate::proxy::ProxyContext;
use crate::store::{AddOutcome, NewSubscriber, Subscriber, SubscriberStore};

/// Message returned when a new subscriber is stored.
pub const SUBSCRIBED_MESSAGE: &str = "Thank you for subscribing!";

/// Message returned when the email is already registered.
pub const DUPLICATE_MESSAGE: &str = "This email is already subscribed!";

/// Message returned by the generic form endpoint.
pub const FORM_SUBMITTED_MESSAGE: &str = "Form submitted successfully";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: SubscriberStore> {
    /// Subscriber storage collaborator
    pub store: Arc<S>,

    /// Articles and products rendered by the content pages
    pub catalog: Arc<Catalog>,
}

impl<S: SubscriberStore> AppState<S> {
    /// Create application state with the default catalog.
    pub fn new(store: S) -> Self {
        Self::with_catalog(store, Catalog::default())
    }

    pub fn with_catalog(store: S, catalog: Catalog) -> Self {
        Self::from_shared(Arc::new(store), catalog)
    }

    /// Create application state around a store the caller keeps a handle to.
    pub fn from_shared(store: Arc<S>, catalog: Catalog) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
        }
    }
}

impl<S: SubscriberStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Body of `POST /proxy/subscribe`, JSON or form-encoded.
///
/// Fields are optional here so a missing one is reported as a validation
/// error rather than a decoding failure.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl SubscribeRequest {
    /// Trim and validate the fields, returning `(name, email)`.
    pub fn validate(self) -> Result<(String, String), SubscribeError> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;

        if !is_plausible_email(&email) {
            return Err(SubscribeError::InvalidEmail);
        }

        Ok((name, email))
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, SubscribeError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(SubscribeError::MissingField(field))
}

/// Shape check only: `local@domain.tld`, no whitespace, a single `@`.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Decode a POST body according to its `Content-Type`.
///
/// Form bodies are decoded into string fields; an empty body with no content
/// type decodes as an empty object.
fn decode_body<T: DeserializeOwned>(
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<T, SubscribeError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/json" => {
            serde_json::from_slice(body).map_err(|e| SubscribeError::MalformedBody(e.to_string()))
        }
        "application/x-www-form-urlencoded" => decode_form(body),
        "" if body.is_empty() => decode_form(body),
        _ => Err(SubscribeError::UnsupportedContentType(
            content_type.to_string(),
        )),
    }
}

fn decode_form<T: DeserializeOwned>(body: &Bytes) -> Result<T, SubscribeError> {
    let fields: serde_json::Map<String, serde_json::Value> = form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), serde_json::Value::String(v.into_owned())))
        .collect();
    serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| SubscribeError::MalformedBody(e.to_string()))
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for client and server errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "missing_field")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "OK" while the process serves requests
    pub status: String,

    /// Current time, RFC 3339 UTC with milliseconds
    pub timestamp: String,
}

/// Outcome of a subscription or form submission.
///
/// A duplicate subscription is a business-rule failure, not an HTTP error:
/// it comes back as `200` with `success: false`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
}

impl SubmissionResponse {
    fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
        }
    }
}

/// Response from the admin subscribers endpoint.
#[derive(Debug, Serialize)]
pub struct SubscribersResponse {
    pub total: usize,
    pub subscribers: Vec<Subscriber>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Errors a handler can surface, each mapped to a JSON error response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] SubscribeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for SubscribeError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            SubscribeError::MissingField(_) => (StatusCode::BAD_REQUEST, "missing_field"),
            SubscribeError::InvalidEmail => (StatusCode::BAD_REQUEST, "invalid_email"),
            SubscribeError::UnsupportedContentType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_content_type")
            }
            SubscribeError::MalformedBody(_) => (StatusCode::BAD_REQUEST, "malformed_body"),
        };

        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Request rejected: {}",
            self
        );

        let body = ErrorResponse::with_status(error_type, self.to_string(), status);
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        error!(error = %self, status = status.as_u16(), "Subscriber store failure");

        // Store details stay in the logs
        let body = ErrorResponse::with_status(
            "store_unavailable",
            "Subscriber storage is temporarily unavailable",
            status,
        );
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => err.into_response(),
            ApiError::Store(err) => err.into_response(),
        }
    }
}

// =============================================================================
// Proxy Handlers
// =============================================================================

/// Default page for `/proxy` and any proxy subpath without its own route.
pub async fn home_handler(ctx: ProxyContext) -> Html<String> {
    info!(
        shop = ?ctx.shop,
        customer_id = ?ctx.logged_in_customer(),
        logged_in = ctx.logged_in,
        "proxy_home"
    );
    Html(render::render_home(&ctx))
}

/// News listing.
pub async fn news_handler<S: SubscriberStore>(
    State(state): State<AppState<S>>,
    ctx: ProxyContext,
) -> Html<String> {
    Html(render::render_news(&ctx, &state.catalog.articles))
}

/// Product listing.
pub async fn products_handler<S: SubscriberStore>(
    State(state): State<AppState<S>>,
    ctx: ProxyContext,
) -> Html<String> {
    Html(render::render_products(&ctx, &state.catalog.products))
}

/// Newsletter signup form.
pub async fn subscribe_form_handler(ctx: ProxyContext) -> Html<String> {
    Html(render::render_subscribe_form(&ctx))
}

/// Handle newsletter signups.
///
/// # Endpoint
///
/// `POST /proxy/subscribe` with a JSON or form body:
/// ```json
/// { "name": "Jo", "email": "jo@x.com" }
/// ```
///
/// # Response
///
/// `200 OK` with `{"success": true, "message": "Thank you for subscribing!"}`,
/// or `success: false` when the email is already registered.
///
/// # Errors
///
/// - `400 Bad Request`: Missing `name`/`email`, invalid email, undecodable body
/// - `415 Unsupported Media Type`: Body is neither JSON nor form-encoded
/// - `500 Internal Server Error`: Subscriber store failure
pub async fn subscribe_handler<S: SubscriberStore>(
    State(state): State<AppState<S>>,
    ctx: ProxyContext,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let request: SubscribeRequest = decode_body(&headers, &body)?;
    let (name, email) = request.validate()?;

    let subscriber = NewSubscriber::new(name, email)
        .with_shop(ctx.shop.clone())
        .with_customer_id(ctx.logged_in_customer().map(str::to_string));

    let response = match state.store.add(subscriber).await? {
        AddOutcome::Accepted => {
            info!(shop = ?ctx.shop, "subscriber_accepted");
            SubmissionResponse::new(true, SUBSCRIBED_MESSAGE)
        }
        AddOutcome::Duplicate => {
            info!(shop = ?ctx.shop, "subscriber_duplicate");
            SubmissionResponse::new(false, DUPLICATE_MESSAGE)
        }
    };

    Ok(Json(response))
}

/// Generic form submission on the proxy root.
///
/// Accepts any JSON object or form body and acknowledges it. Only field
/// names are logged, values may hold customer data.
pub async fn form_submission_handler(
    ctx: ProxyContext,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let fields: serde_json::Map<String, serde_json::Value> = decode_body(&headers, &body)?;

    info!(
        shop = ?ctx.shop,
        fields = ?fields.keys().collect::<Vec<_>>(),
        "proxy_form_submitted"
    );

    Ok(Json(SubmissionResponse::new(true, FORM_SUBMITTED_MESSAGE)))
}

// =============================================================================
// Operator Handlers
// =============================================================================

/// List all subscribers.
///
/// Only mounted when an admin token is configured; see the routes module.
pub async fn admin_subscribers_handler<S: SubscriberStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<SubscribersResponse>, ApiError> {
    let subscribers = state.store.list().await?;
    debug!(total = subscribers.len(), "admin_subscribers_listed");

    Ok(Json(SubscribersResponse {
        total: subscribers.len(),
        subscribers,
    }))
}

/// Health check endpoint.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// { "status": "OK", "timestamp": "2024-01-15T10:30:00.000Z" }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Fallback for paths outside every registered route.
pub async fn not_found_handler(uri: Uri) -> Response {
    let status = StatusCode::NOT_FOUND;
    debug!(path = %uri.path(), "route_not_found");
    let body = ErrorResponse::with_status(
        "not_found",
        format!("No route for {}", uri.path()),
        status,
    );
    (status, Json(body)).into_response()
}

// =============================================================================
// Tests
// =============================================================================
