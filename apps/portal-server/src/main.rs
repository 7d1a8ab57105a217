//! Network Access Portal server.
//!
//! Serves the access request API, the identity-provider token relay,
//! health checks and API documentation.

mod app;
mod config;
mod handlers;
mod logging;
mod openapi;

use std::net::SocketAddr;

use portal_api_auth::IdpClient;
use portal_auth::{JwksClient, TokenVerifier, ValidationConfig};
use tokio::signal;
use tracing::info;

use crate::config::Config;

#[tokio::main]
async fn main() {
    // Load .env file if present (development only)
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        env = %config.app_env,
        "Starting Network Access Portal"
    );

    match config.validate_security_config() {
        Ok(warnings) => {
            for warning in &warnings {
                tracing::warn!(target: "security", "{}", warning);
            }
        }
        Err(errors) => {
            for error in &errors {
                tracing::error!(target: "security", "{}", error);
            }
            eprintln!(
                "FATAL: {} insecure default(s) detected in production mode.",
                errors.len()
            );
            std::process::exit(1);
        }
    }

    let pool = match portal_db::connect(&config.database_url, config.db_max_connections).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };
    info!("Database connection pool created");

    if let Err(e) = portal_db::run_migrations(&pool).await {
        tracing::error!("Failed to run migrations: {e}");
        std::process::exit(1);
    }

    let jwks = match JwksClient::new(config.jwks_url()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to create JWKS client: {e}");
            std::process::exit(1);
        }
    };
    let mut validation = ValidationConfig::default().issuer(config.idp_settings().issuer());
    if let Some(audience) = &config.idp.audience {
        validation = validation.audience(vec![audience.clone()]);
    }
    let verifier = TokenVerifier::jwks(jwks, validation);
    info!(jwks_url = %config.jwks_url(), "Token verification configured");

    let idp_client = match IdpClient::new(config.idp_settings()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to create identity provider client: {e}");
            std::process::exit(1);
        }
    };

    let app = app::build_router(&config, pool, verifier, idp_client);

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
