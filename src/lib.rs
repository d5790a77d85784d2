//! # Storefront Proxy
//!
//! A backend for Shopify app proxies. The platform forwards storefront
//! requests under a reserved path (e.g. `/apps/news`) to this server and signs
//! their query parameters with the app's shared secret. Nothing is served
//! until that signature checks out.
//!
//! ## Features
//!
//! - **Signature verification**: HMAC-SHA256 over the sorted parameters,
//!   compared in constant time
//! - **Guarded routing**: every `/proxy` route sits behind one middleware;
//!   handlers only ever see a verified [`ProxyContext`]
//! - **Content pages**: home, news, products and a newsletter signup form
//! - **Subscriber store**: deduplicated, append-only, safe under concurrent signups
//!
//! ## Architecture
//!
//! - [`proxy`] - Parameter canonicalization, signature checks, verified context
//! - [`server`] - Axum guard, routes and handlers
//! - [`store`] - Subscriber storage trait and in-memory implementation
//! - [`content`] - Articles, products and HTML rendering
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use storefront_proxy::{create_router, AppState, MemorySubscriberStore, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = AppState::new(MemorySubscriberStore::new());
//!     let router = create_router(state, RouterConfig::new("app-secret"));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod proxy;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::{Cli, Command, ServeConfig, SignConfig, SignOutputFormat};
pub use content::{Article, Catalog, Product};
pub use error::{ConfigError, StoreError, SubscribeError};
pub use proxy::{
    canonicalize, parse_query, ProxyContext, ProxyParams, ProxySignature, VerifyError,
    SIGNATURE_PARAM,
};
pub use server::{
    create_memory_router, create_router, AppState, ErrorResponse, GuardRejection, HealthResponse,
    ProxyGuard, RouterConfig, SubmissionResponse, SubscribersResponse,
};
pub use store::{AddOutcome, MemorySubscriberStore, NewSubscriber, Subscriber, SubscriberStore};
