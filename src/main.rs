//! Storefront Proxy - verified app proxy backend.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_proxy::{
    config::{Cli, Command, ServeConfig, SignConfig, SignOutputFormat},
    proxy::{canonicalize, ProxyParams, ProxySignature, SIGNATURE_PARAM},
    server::{create_router, AppState, RouterConfig},
    store::MemorySubscriberStore,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Sign(config) => run_sign(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let addr = config.bind_address();

    info!("Storefront Proxy v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Listen: {}", addr);
    match config.max_signature_age {
        Some(secs) => info!("  Signature freshness window: {}s", secs),
        None => info!("  Signature freshness window: off"),
    }
    if config.admin_token.is_some() {
        info!("  Admin route: /admin/subscribers (bearer token required)");
    } else {
        warn!("  Admin route: not mounted (set ADMIN_TOKEN to enable)");
    }

    let state = AppState::new(MemorySubscriberStore::new());
    let router = create_router(state, build_router_config(&config));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("App proxy server running on http://{}", addr);
    info!("  curl http://{}/health", addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "storefront_proxy=debug,tower_http=debug"
    } else {
        "storefront_proxy=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config =
        RouterConfig::new(config.api_secret_or_empty()).with_tracing(!config.no_tracing);

    if let Some(max_age) = config.max_signature_age() {
        router_config = router_config.with_max_signature_age(max_age);
    }

    if let Some(ref token) = config.admin_token {
        router_config = router_config.with_admin_token(token.clone());
    }

    router_config
}

// =============================================================================
// Sign Command
// =============================================================================

fn run_sign(config: SignConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let params = match config.parse_params() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let signature = ProxySignature::new(&config.secret).sign(&params);
    let query = build_query_string(&params, &signature);

    match config.format {
        SignOutputFormat::Signature => {
            println!("{}", signature);
        }
        SignOutputFormat::Query => match config.base_url {
            Some(ref base_url) => {
                println!("{}", build_url(base_url, &config.path, &query));
            }
            None => {
                println!("{}", query);
                eprintln!();
                eprintln!("Tip: Use --base-url to generate a complete URL");
            }
        },
        SignOutputFormat::Json => {
            let url = config
                .base_url
                .as_deref()
                .map(|base_url| build_url(base_url, &config.path, &query));

            let json = serde_json::json!({
                "signature": signature,
                "canonical": canonicalize(&params),
                "query": query,
                "url": url,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(out) => println!("{}", out),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

/// Percent-encoded query string with `signature` appended last.
fn build_query_string(params: &ProxyParams, signature: &str) -> String {
    let mut parts: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();

    parts.push(format!("{}={}", SIGNATURE_PARAM, signature));

    parts.join("&")
}

fn build_url(base_url: &str, path: &str, query: &str) -> String {
    format!("{}{}?{}", base_url.trim_end_matches('/'), path, query)
}
