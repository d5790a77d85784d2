use thiserror::Error;

/// Startup configuration errors. Fatal: the server never binds a socket.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The shared app secret is absent or blank
    #[error("App secret is not set. Set --api-secret or SHOPIFY_API_SECRET")]
    MissingSecret,

    /// Port 0 would bind a random port the platform cannot be pointed at
    #[error("Port must be between 1 and 65535")]
    InvalidPort,

    /// An admin token was given but is blank
    #[error("Admin token must not be empty. Unset ADMIN_TOKEN to disable the admin route")]
    EmptyAdminToken,

    /// A freshness window of zero would reject every request
    #[error("max_signature_age must be greater than 0")]
    InvalidMaxAge,

    /// A `sign` parameter is not a `key=value` pair, or names `signature`
    #[error("Invalid parameter '{0}': expected key=value with a key other than 'signature'")]
    InvalidParam(String),
}

/// Errors from the subscriber storage collaborator
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation
    #[error("Subscriber store unavailable: {0}")]
    Unavailable(String),
}

/// Request body validation errors for subscription and form submissions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeError {
    /// A required field is missing or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The email address is not shaped like one
    #[error("Invalid email address")]
    InvalidEmail,

    /// The body is neither JSON nor form-encoded
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// The body could not be decoded
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}
