//! Configuration management for the storefront proxy.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables (the platform's conventional names)
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! - `SHOPIFY_API_SECRET` - Shared app secret (required)
//! - `HOST` - Server bind address (default: 0.0.0.0)
//! - `PORT` - Server port (default: 3000)
//! - `ADMIN_TOKEN` - Enables `/admin/subscribers` behind this bearer token
//! - `PROXY_MAX_SIGNATURE_AGE` - Freshness window for `timestamp`, in seconds
//!
//! # Subcommands
//!
//! - `serve` (default) - Run the HTTP server
//! - `sign` - Compute a proxy signature for hand-crafted test requests

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::ConfigError;
use crate::proxy::{ProxyParams, SIGNATURE_PARAM};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default request path used by `sign` when building URLs.
pub const DEFAULT_SIGN_PATH: &str = "/proxy";

// =============================================================================
// CLI
// =============================================================================

/// Storefront Proxy - verified app proxy backend for Shopify storefronts.
#[derive(Parser, Debug, Clone)]
#[command(name = "storefront-proxy")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Server options when no subcommand is given
    #[command(flatten)]
    pub serve: ServeConfig,
}

impl Cli {
    /// Resolve the subcommand, defaulting to `serve`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeConfig),

    /// Print the proxy signature for a set of query parameters
    Sign(SignConfig),
}

// =============================================================================
// Serve
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Shared app secret used to verify proxy signatures.
    ///
    /// The server refuses to start without it.
    #[arg(long, env = "SHOPIFY_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    /// Bearer token for `/admin/subscribers`.
    ///
    /// When unset the admin route is not mounted at all.
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Reject requests whose `timestamp` is more than this many seconds from now.
    #[arg(long, env = "PROXY_MAX_SIGNATURE_AGE")]
    pub max_signature_age: Option<u64>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .api_secret
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
        {
            return Err(ConfigError::MissingSecret);
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if let Some(token) = &self.admin_token {
            if token.trim().is_empty() {
                return Err(ConfigError::EmptyAdminToken);
            }
        }

        if self.max_signature_age == Some(0) {
            return Err(ConfigError::InvalidMaxAge);
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the app secret, or an empty string if not set (call validate() first).
    pub fn api_secret_or_empty(&self) -> &str {
        self.api_secret.as_deref().unwrap_or("")
    }

    pub fn max_signature_age(&self) -> Option<Duration> {
        self.max_signature_age.map(Duration::from_secs)
    }
}

// =============================================================================
// Sign
// =============================================================================

/// Output format of the `sign` subcommand.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignOutputFormat {
    /// Only the hex signature
    Signature,

    /// Full query string including `signature`, or a URL with --base-url
    #[default]
    Query,

    /// JSON object with signature, canonical payload and query
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct SignConfig {
    /// Shared app secret.
    #[arg(long, env = "SHOPIFY_API_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Query parameters as key=value pairs (e.g. shop=a.myshopify.com).
    #[arg(value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = SignOutputFormat::Query)]
    pub format: SignOutputFormat,

    /// Base URL to prefix the request path with (e.g. http://localhost:3000).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Request path used with --base-url.
    #[arg(long, default_value = DEFAULT_SIGN_PATH)]
    pub path: String,
}

impl SignConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(())
    }

    /// Parse the positional `key=value` pairs.
    ///
    /// Repeated keys are joined with `,`, the same way the proxy guard reads
    /// them from a query string.
    pub fn parse_params(&self) -> Result<ProxyParams, ConfigError> {
        let mut params = ProxyParams::new();
        for raw in &self.params {
            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidParam(raw.clone()))?;

            if key.is_empty() || key == SIGNATURE_PARAM {
                return Err(ConfigError::InvalidParam(raw.clone()));
            }

            params
                .entry(key.to_string())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        Ok(params)
    }
}

// =============================================================================
// Tests
// =============================================================================
