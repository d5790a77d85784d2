//! Verified request context handed to proxy handlers.

use serde::Serialize;

use super::signature::ProxyParams;

/// Read-only view of the platform parameters of a verified proxy request.
///
/// Built by the guard only after the signature checked out, so every field
/// here can be trusted to come from the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProxyContext {
    /// Store domain (e.g. "a.myshopify.com")
    pub shop: Option<String>,

    /// Customer id, only present when a customer is logged in
    pub customer_id: Option<String>,

    /// Whether the platform reported a logged-in customer
    pub logged_in: bool,

    /// Unix timestamp the platform attached to the request
    pub timestamp: Option<String>,

    /// Storefront prefix the proxy is mounted under (e.g. "/apps/news")
    pub path_prefix: Option<String>,

    /// Storefront subpath that was requested
    pub subpath: Option<String>,
}

impl ProxyContext {
    /// Extract the context from verified parameters.
    ///
    /// Empty values are treated as absent. `logged_in` is true only for the
    /// exact string `"true"`.
    pub fn from_params(params: &ProxyParams) -> Self {
        let get = |key: &str| {
            params
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
        };

        Self {
            shop: get("shop"),
            customer_id: get("customer_id"),
            logged_in: params.get("logged_in").map(String::as_str) == Some("true"),
            timestamp: get("timestamp"),
            path_prefix: get("path_prefix"),
            subpath: get("subpath"),
        }
    }

    /// Shop domain for display, falling back to a neutral label.
    pub fn shop_or_unknown(&self) -> &str {
        self.shop.as_deref().unwrap_or("unknown shop")
    }

    /// Customer id, but only when the platform reports a logged-in customer.
    pub fn logged_in_customer(&self) -> Option<&str> {
        if self.logged_in {
            self.customer_id.as_deref()
        } else {
            None
        }
    }

    /// Parse the platform timestamp as Unix seconds.
    pub fn timestamp_secs(&self) -> Option<i64> {
        self.timestamp.as_deref().and_then(|t| t.parse().ok())
    }
}
