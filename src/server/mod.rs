//! HTTP server layer for the storefront proxy.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           HTTP Layer                             │
//! │                   GET/POST /proxy/{subpath}                      │
//! │                                                                  │
//! │  ┌─────────────┐   ┌─────────────┐   ┌──────────────────────┐    │
//! │  │   guard     │ → │   routes    │ → │      handlers        │    │
//! │  │ (signature) │   │ (dispatch)  │   │ (content, subscribe) │    │
//! │  └─────────────┘   └─────────────┘   └──────────────────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod guard;
pub mod handlers;
pub mod routes;

pub use guard::{admin_guard, proxy_guard, AdminToken, GuardRejection, ProxyGuard};
pub use handlers::{
    admin_subscribers_handler, form_submission_handler, health_handler, home_handler,
    news_handler, not_found_handler, products_handler, subscribe_form_handler,
    subscribe_handler, ApiError, AppState, ErrorResponse, HealthResponse, SubmissionResponse,
    SubscribeRequest, SubscribersResponse,
};
pub use routes::{create_memory_router, create_router, RouterConfig};
