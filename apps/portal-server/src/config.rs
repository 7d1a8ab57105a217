//! Application configuration loaded from environment variables.
//!
//! Loading is fail-fast: a missing or malformed required variable stops
//! startup with a message naming it.

use std::env;
use std::time::Duration;

use portal_api::PublicConfig;
use portal_api_auth::IdpSettings;
use thiserror::Error;

use crate::logging::DEFAULT_LOG_FILTER;

/// Default `IDP_CLIENT_SECRET`, only acceptable outside production.
pub const INSECURE_CLIENT_SECRET: &str = "change-me";

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8000";

/// Application environment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    /// Parse an `APP_ENV` value. Unrecognized values mean development.
    pub fn from_env_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => {
                tracing::warn!(
                    value = other,
                    "Unrecognized APP_ENV value, defaulting to Development"
                );
                Self::Development
            }
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }
}

impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Identity provider settings.
#[derive(Debug, Clone)]
pub struct IdpConfig {
    pub server_url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    /// Expected `aud` claim; unchecked when unset.
    pub audience: Option<String>,
    /// Overrides the realm's derived JWKS endpoint.
    pub jwks_url: Option<String>,
    pub timeout_secs: u64,
}

/// Branding shown by the browser client.
#[derive(Debug, Clone)]
pub struct BrandingConfig {
    pub app_title: String,
    pub app_logo_url: String,
    pub app_theme_color: String,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnvironment,
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub cors_origins: Vec<String>,
    pub idp: IdpConfig,
    pub branding: BrandingConfig,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - PostgreSQL connection string (required)
    /// - `DB_MAX_CONNECTIONS` - Pool size (default: 10)
    /// - `HOST` / `PORT` - Bind address (default: 0.0.0.0:8000)
    /// - `RUST_LOG` - Log filter (default: [`DEFAULT_LOG_FILTER`])
    /// - `APP_ENV` - "development" or "production" (default: development)
    /// - `CORS_ORIGINS` - Comma-separated allowed origins
    /// - `IDP_SERVER_URL`, `IDP_REALM`, `IDP_CLIENT_ID`, `IDP_CLIENT_SECRET`
    /// - `IDP_AUDIENCE`, `IDP_JWKS_URL` (optional), `IDP_TIMEOUT_SECS` (default: 30)
    /// - `APP_TITLE`, `APP_LOGO_URL`, `APP_THEME_COLOR`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let app_env = AppEnvironment::from_env_str(&or_default("APP_ENV", "development"));

        let database_url =
            get("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 10u32)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                var: "DB_MAX_CONNECTIONS".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        let port = parse_or("PORT", get("PORT"), 8000u16)?;
        let timeout_secs = parse_or("IDP_TIMEOUT_SECS", get("IDP_TIMEOUT_SECS"), 30u64)?;

        let cors_origins = or_default("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            app_env,
            database_url,
            db_max_connections,
            host: or_default("HOST", "0.0.0.0"),
            port,
            rust_log: or_default("RUST_LOG", DEFAULT_LOG_FILTER),
            cors_origins,
            idp: IdpConfig {
                server_url: or_default("IDP_SERVER_URL", "http://localhost:8080"),
                realm: or_default("IDP_REALM", "network-access"),
                client_id: or_default("IDP_CLIENT_ID", "network-portal"),
                client_secret: or_default("IDP_CLIENT_SECRET", INSECURE_CLIENT_SECRET),
                audience: get("IDP_AUDIENCE"),
                jwks_url: get("IDP_JWKS_URL"),
                timeout_secs,
            },
            branding: BrandingConfig {
                app_title: or_default("APP_TITLE", "Network Access Portal"),
                app_logo_url: or_default("APP_LOGO_URL", "/logo.png"),
                app_theme_color: or_default("APP_THEME_COLOR", "#1976d2"),
            },
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check for insecure defaults.
    ///
    /// Returns the issues as warnings in development and as errors in
    /// production.
    pub fn validate_security_config(&self) -> Result<Vec<String>, Vec<String>> {
        let mut issues = Vec::new();

        if self.idp.client_secret == INSECURE_CLIENT_SECRET {
            issues.push("IDP_CLIENT_SECRET is using the default insecure value".to_string());
        }

        if self.cors_origins.iter().any(|o| o == "*") {
            issues.push("CORS_ORIGINS allows any origin".to_string());
        }

        if self.app_env.is_production() && !issues.is_empty() {
            Err(issues)
        } else {
            Ok(issues)
        }
    }

    /// Settings for the identity provider relay.
    #[must_use]
    pub fn idp_settings(&self) -> IdpSettings {
        IdpSettings {
            server_url: self.idp.server_url.clone(),
            realm: self.idp.realm.clone(),
            client_id: self.idp.client_id.clone(),
            client_secret: self.idp.client_secret.clone(),
            timeout: Duration::from_secs(self.idp.timeout_secs),
        }
    }

    /// JWKS endpoint for token verification.
    #[must_use]
    pub fn jwks_url(&self) -> String {
        self.idp
            .jwks_url
            .clone()
            .unwrap_or_else(|| self.idp_settings().jwks_url())
    }

    /// Settings served unauthenticated to the browser client.
    #[must_use]
    pub fn public_config(&self) -> PublicConfig {
        PublicConfig {
            app_title: self.branding.app_title.clone(),
            app_logo_url: self.branding.app_logo_url.clone(),
            app_theme_color: self.branding.app_theme_color.clone(),
            auth_server_url: self.idp.server_url.clone(),
            auth_realm: self.idp.realm.clone(),
            auth_client_id: self.idp.client_id.clone(),
        }
    }
}

fn parse_or<T>(var: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: var.to_string(),
            message: e.to_string(),
        }),
    }
}
