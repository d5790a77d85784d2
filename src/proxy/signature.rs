//! App proxy request signatures.
//!
//! The platform signs every request it forwards through the app proxy by
//! computing an HMAC-SHA256 over the query parameters (excluding `signature`)
//! with the app's shared secret:
//!
//! ```text
//! canonical = concat(sorted(key=value for every key != "signature"))
//! signature = hex(HMAC-SHA256(secret, canonical))
//! ```
//!
//! Unlike an ordinary query string there is no separator between pairs, and
//! values are signed exactly as decoded. A key that appears several times is
//! signed once with its values joined by commas.
//!
//! ```text
//! /proxy?shop=a.myshopify.com&timestamp=1700000000&signature=ab12...
//! canonical: "shop=a.myshopify.comtimestamp=1700000000"
//! ```
//!
//! # Example
//!
//! ```rust
//! use storefront_proxy::proxy::{parse_query, ProxySignature};
//!
//! let signer = ProxySignature::new("shhh");
//! let mut params = parse_query("shop=a.myshopify.com&timestamp=1700000000");
//! let signature = signer.sign(&params);
//! params.insert("signature".to_string(), signature);
//!
//! assert!(signer.verify(&params).is_ok());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;
use url::form_urlencoded;

/// HMAC-SHA256 type alias
type HmacSha256 = Hmac<Sha256>;

/// Name of the reserved query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";

/// Decoded query parameters of a proxied request, ordered byte-wise by key.
pub type ProxyParams = BTreeMap<String, String>;

// =============================================================================
// Errors
// =============================================================================

/// Why a set of proxy parameters failed verification.
///
/// Only used for internal diagnostics. Callers must never echo the variant
/// back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// No `signature` parameter was present
    #[error("Missing signature parameter")]
    MissingSignature,

    /// The supplied signature does not match the computed digest
    #[error("Signature mismatch")]
    Mismatch,
}

impl VerifyError {
    /// Short tag used in log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            VerifyError::MissingSignature => "missing_signature",
            VerifyError::Mismatch => "mismatch",
        }
    }
}

// =============================================================================
// Verifier
// =============================================================================

/// Signs and verifies app proxy parameter sets with a shared secret.
#[derive(Clone)]
pub struct ProxySignature {
    /// Secret key for HMAC computation
    secret: Vec<u8>,
}

impl ProxySignature {
    /// Create a verifier for the given shared secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Compute the hex-encoded signature for `params`.
    ///
    /// Any `signature` entry in `params` is ignored.
    pub fn sign(&self, params: &ProxyParams) -> String {
        self.compute_signature(&canonicalize(params))
    }

    /// Verify the `signature` entry of `params` against the remaining entries.
    ///
    /// Returns [`VerifyError::MissingSignature`] without computing any digest
    /// when the parameter is absent. The comparison is constant-time and
    /// case-sensitive: an upper-case rendering of a valid digest is a mismatch.
    pub fn verify(&self, params: &ProxyParams) -> Result<(), VerifyError> {
        let provided = params
            .get(SIGNATURE_PARAM)
            .ok_or(VerifyError::MissingSignature)?;

        let canonical = canonicalize(params);
        debug!(canonical = %canonical, "proxy_signature_computed");

        let expected = self.compute_signature(&canonical);

        // Slice ct_eq also returns false on length mismatch
        if expected.as_bytes().ct_eq(provided.as_bytes()).into() {
            Ok(())
        } else {
            Err(VerifyError::Mismatch)
        }
    }

    /// Boolean form of [`ProxySignature::verify`].
    pub fn is_valid(&self, params: &ProxyParams) -> bool {
        self.verify(params).is_ok()
    }

    fn compute_signature(&self, canonical: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(canonical.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for ProxySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySignature")
            .field("secret", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Canonicalization
// =============================================================================

/// Build the signed payload: every `key=value` pair except `signature`,
/// in ascending byte order of key, concatenated with no separator.
///
/// Values are not re-encoded, so a value containing `=` or `&` is signed as is.
pub fn canonicalize(params: &ProxyParams) -> String {
    let mut canonical = String::new();
    for (key, value) in params {
        if key == SIGNATURE_PARAM {
            continue;
        }
        canonical.push_str(key);
        canonical.push('=');
        canonical.push_str(value);
    }
    canonical
}

/// Decode a raw query string into [`ProxyParams`].
///
/// Uses `application/x-www-form-urlencoded` rules. Repeated keys keep a
/// single entry whose values are joined with `,` in arrival order.
pub fn parse_query(query: &str) -> ProxyParams {
    let mut params = ProxyParams::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    params
}

// =============================================================================
// Tests
// =============================================================================
