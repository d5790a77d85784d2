//! Router configuration for the storefront proxy.
//!
//! This module is the dispatch table: every `(method, path)` the service
//! answers is registered here, together with the guard it sits behind.
//!
//! # Route Structure
//!
//! ```text
//! /health                       - Health check (public)
//! /proxy, /proxy/               - Home page, generic form POST (proxy guard)
//! /proxy/news                   - News listing (proxy guard)
//! /proxy/products               - Product listing (proxy guard)
//! /proxy/subscribe              - Signup form and signup POST (proxy guard)
//! /proxy/{*subpath}             - Default home page for other subpaths (proxy guard)
//! /admin/subscribers            - Subscriber dump (admin token, only if configured)
//! anything else                 - 404
//! ```
//!
//! # Example
//!
//! ```ignore
//! use storefront_proxy::server::{create_router, AppState, RouterConfig};
//! use storefront_proxy::store::MemorySubscriberStore;
//!
//! let state = AppState::new(MemorySubscriberStore::new());
//! let router = create_router(state, RouterConfig::new("app-secret"));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::guard::{admin_guard, proxy_guard, AdminToken, ProxyGuard};
use super::handlers::{
    admin_subscribers_handler, form_submission_handler, health_handler, home_handler,
    news_handler, not_found_handler, products_handler, subscribe_form_handler,
    subscribe_handler, AppState,
};
use crate::proxy::ProxySignature;
use crate::store::{MemorySubscriberStore, SubscriberStore};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Shared app secret used to verify proxy signatures
    pub api_secret: String,

    /// Optional freshness window for the `timestamp` parameter
    pub max_signature_age: Option<Duration>,

    /// Bearer token for the admin route (None = route not mounted)
    pub admin_token: Option<String>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration with the given app secret.
    ///
    /// By default:
    /// - No freshness window
    /// - Admin route not mounted
    /// - Tracing is enabled
    pub fn new(api_secret: impl Into<String>) -> Self {
        Self {
            api_secret: api_secret.into(),
            max_signature_age: None,
            admin_token: None,
            enable_tracing: true,
        }
    }

    /// Reject signed requests whose `timestamp` is further than `max_age` from now.
    pub fn with_max_signature_age(mut self, max_age: Duration) -> Self {
        self.max_signature_age = Some(max_age);
        self
    }

    /// Mount `/admin/subscribers` behind the given bearer token.
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("api_secret", &"<redacted>")
            .field("max_signature_age", &self.max_signature_age)
            .field("admin_enabled", &self.admin_token.is_some())
            .field("enable_tracing", &self.enable_tracing)
            .finish()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - Proxy routes behind the signature guard
/// - Public health route
/// - Admin route, only when a token is configured
/// - A 404 fallback for everything else
/// - Request tracing (optional)
pub fn create_router<S>(state: AppState<S>, config: RouterConfig) -> Router
where
    S: SubscriberStore + 'static,
{
    let guard = ProxyGuard::new(ProxySignature::new(&config.api_secret))
        .with_max_age(config.max_signature_age);

    let mut router = Router::new()
        .merge(build_proxy_routes(state.clone(), guard))
        .route("/health", get(health_handler));

    if let Some(token) = &config.admin_token {
        router = router.merge(build_admin_routes(state, AdminToken::new(token)));
    }

    let router = router.fallback(not_found_handler);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Proxy routes. `route_layer` keeps the guard off unmatched paths so they
/// still fall through to the 404 fallback.
fn build_proxy_routes<S>(state: AppState<S>, guard: ProxyGuard) -> Router
where
    S: SubscriberStore + 'static,
{
    Router::new()
        .route("/proxy", get(home_handler).post(form_submission_handler))
        .route("/proxy/", get(home_handler).post(form_submission_handler))
        .route("/proxy/news", get(news_handler::<S>))
        .route("/proxy/products", get(products_handler::<S>))
        .route(
            "/proxy/subscribe",
            get(subscribe_form_handler).post(subscribe_handler::<S>),
        )
        .route(
            "/proxy/{*subpath}",
            get(home_handler).post(form_submission_handler),
        )
        .route_layer(middleware::from_fn_with_state(guard, proxy_guard))
        .with_state(state)
}

/// Operator routes behind the admin bearer token.
fn build_admin_routes<S>(state: AppState<S>, token: AdminToken) -> Router
where
    S: SubscriberStore + 'static,
{
    Router::new()
        .route("/admin/subscribers", get(admin_subscribers_handler::<S>))
        .route_layer(middleware::from_fn_with_state(token, admin_guard))
        .with_state(state)
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Create a router backed by a fresh in-memory subscriber store.
pub fn create_memory_router(config: RouterConfig) -> Router {
    create_router(AppState::new(MemorySubscriberStore::new()), config)
}

// =============================================================================
// Tests
// =============================================================================
