//! Request guards for the HTTP layer.
//!
//! # Proxy guard
//!
//! Every `/proxy` route sits behind [`proxy_guard`]. The middleware verifies
//! the platform signature over the raw query parameters exactly once, and only
//! on success inserts a [`ProxyContext`] into the request extensions and runs
//! the handler. Failures get a fixed `401 Unauthorized` whatever the cause, so
//! a caller cannot learn whether the signature was absent, wrong or stale.
//!
//! Handlers take [`ProxyContext`] as an extractor. The extractor rejects with
//! the same 401 when no context is present, so a route that was never wired
//! through the guard cannot serve content by accident.
//!
//! # Admin guard
//!
//! [`admin_guard`] protects operator endpoints with a static bearer token
//! compared in constant time.
//!
//! # Example
//!
//! ```ignore
//! use axum::{middleware, routing::get, Router};
//! use storefront_proxy::proxy::ProxySignature;
//! use storefront_proxy::server::guard::{proxy_guard, ProxyGuard};
//!
//! let guard = ProxyGuard::new(ProxySignature::new("app-secret"));
//! let app = Router::new()
//!     .route("/proxy", get(home))
//!     .route_layer(middleware::from_fn_with_state(guard, proxy_guard));
//! ```

use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::proxy::{parse_query, ProxyContext, ProxySignature, VerifyError};

/// Body of every guard rejection.
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";

// =============================================================================
// Rejections
// =============================================================================

/// Why the proxy guard refused a request. Never shown to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardRejection {
    /// Signature missing or wrong
    Signature(VerifyError),

    /// Signature valid but `timestamp` absent, malformed or outside the window
    Stale {
        /// Parsed request timestamp, if any
        timestamp: Option<i64>,
    },

    /// Handler reached without a verified context
    MissingContext,
}

impl GuardRejection {
    /// Short tag used in log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            GuardRejection::Signature(err) => err.reason(),
            GuardRejection::Stale { .. } => "stale",
            GuardRejection::MissingContext => "missing_context",
        }
    }
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        // A missing signature is what any crawler hitting the server directly
        // produces, so keep it out of warn-level logs
        match &self {
            GuardRejection::Signature(VerifyError::MissingSignature) => {
                debug!(reason = self.reason(), "proxy_request_rejected");
            }
            GuardRejection::Stale { timestamp } => {
                warn!(reason = self.reason(), timestamp = ?timestamp, "proxy_request_rejected");
            }
            _ => {
                warn!(reason = self.reason(), "proxy_request_rejected");
            }
        }

        (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response()
    }
}

// =============================================================================
// Proxy Guard
// =============================================================================

/// Gate for proxy routes: signature check plus an optional freshness window.
#[derive(Debug, Clone)]
pub struct ProxyGuard {
    signature: ProxySignature,

    /// Maximum allowed distance between `timestamp` and now (None = no check)
    max_age: Option<Duration>,
}

impl ProxyGuard {
    pub fn new(signature: ProxySignature) -> Self {
        Self {
            signature,
            max_age: None,
        }
    }

    /// Require `timestamp` to lie within `max_age` of the current time.
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Verify a raw query string and build the handler context.
    ///
    /// Parameters are never modified: the context is derived from exactly
    /// what was signed.
    pub fn check(&self, query: &str) -> Result<ProxyContext, GuardRejection> {
        let params = parse_query(query);
        self.signature
            .verify(&params)
            .map_err(GuardRejection::Signature)?;

        let context = ProxyContext::from_params(&params);

        if let Some(max_age) = self.max_age {
            check_freshness(&context, max_age)?;
        }

        Ok(context)
    }
}

fn check_freshness(context: &ProxyContext, max_age: Duration) -> Result<(), GuardRejection> {
    let timestamp = context.timestamp_secs();
    let Some(sent_at) = timestamp else {
        return Err(GuardRejection::Stale { timestamp });
    };

    let age = Utc::now().timestamp().abs_diff(sent_at);
    if age > max_age.as_secs() {
        return Err(GuardRejection::Stale { timestamp });
    }

    Ok(())
}

/// Axum middleware verifying app proxy signatures.
///
/// On success the [`ProxyContext`] is stored in the request extensions for
/// the handler; on failure the handler never runs.
pub async fn proxy_guard(
    State(guard): State<ProxyGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    let query = request.uri().query().unwrap_or("");
    let context = guard.check(query)?;

    debug!(
        shop = ?context.shop,
        logged_in = context.logged_in,
        path = %request.uri().path(),
        "proxy_request_verified"
    );

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for ProxyContext
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ProxyContext>()
            .cloned()
            .ok_or(GuardRejection::MissingContext)
    }
}

// =============================================================================
// Admin Guard
// =============================================================================

/// Bearer token required by operator endpoints.
#[derive(Clone)]
pub struct AdminToken(Vec<u8>);

impl AdminToken {
    pub fn new(token: impl AsRef<[u8]>) -> Self {
        Self(token.as_ref().to_vec())
    }

    /// Check an `Authorization` header value of the form `Bearer <token>`.
    pub fn matches(&self, authorization: Option<&str>) -> bool {
        authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|provided| bool::from(provided.as_bytes().ct_eq(&self.0)))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminToken(<redacted>)")
    }
}

/// Axum middleware requiring the admin bearer token.
pub async fn admin_guard(
    State(token): State<AdminToken>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if !token.matches(authorization) {
        warn!(
            has_authorization = authorization.is_some(),
            path = %request.uri().path(),
            "admin_request_rejected"
        );
        return (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, "Bearer")],
            UNAUTHORIZED_BODY,
        )
            .into_response();
    }

    next.run(request).await
}

// =============================================================================
// Tests
// =============================================================================
