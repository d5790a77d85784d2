//! App proxy request authentication.
//!
//! - [`ProxySignature`]: canonicalizes query parameters and checks the
//!   platform's HMAC-SHA256 signature
//! - [`ProxyContext`]: the verified platform parameters handlers work with

mod context;
mod signature;

pub use context::ProxyContext;
pub use signature::{
    canonicalize, parse_query, ProxyParams, ProxySignature, VerifyError, SIGNATURE_PARAM,
};
