//! OAuth2 relay to the identity provider.
//!
//! The portal holds the confidential client secret and forwards code
//! exchange, refresh and revocation on behalf of the browser.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::AuthApiError;
use crate::models::TokenSet;

/// Identity provider connection settings.
#[derive(Debug, Clone)]
pub struct IdpSettings {
    /// Base URL, e.g. `https://sso.example.com`.
    pub server_url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

impl IdpSettings {
    fn realm_endpoint(&self, name: &str) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/{}",
            self.server_url.trim_end_matches('/'),
            self.realm,
            name
        )
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        self.realm_endpoint("token")
    }

    #[must_use]
    pub fn revoke_url(&self) -> String {
        self.realm_endpoint("revoke")
    }

    #[must_use]
    pub fn jwks_url(&self) -> String {
        self.realm_endpoint("certs")
    }

    /// Expected `iss` claim of tokens minted by this realm.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!(
            "{}/realms/{}",
            self.server_url.trim_end_matches('/'),
            self.realm
        )
    }
}

/// OAuth2 error body.
#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Result of a revocation attempt. Logout succeeds either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    /// The provider answered with a non-success status.
    Refused,
    /// The provider could not be reached.
    Failed,
}

/// Client for the provider's token and revocation endpoints.
#[derive(Debug, Clone)]
pub struct IdpClient {
    settings: IdpSettings,
    http_client: Client,
}

impl IdpClient {
    /// Create a client whose requests time out after `settings.timeout`.
    ///
    /// # Errors
    ///
    /// `Internal` when the HTTP client cannot be built.
    pub fn new(settings: IdpSettings) -> Result<Self, AuthApiError> {
        let http_client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AuthApiError::Internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            settings,
            http_client,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &IdpSettings {
        &self.settings
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the provider rejects the code,
    /// `UpstreamUnavailable` when it cannot be reached in time.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, AuthApiError> {
        tracing::info!(redirect_uri = %redirect_uri, "Attempting token exchange");

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
        ];

        let tokens = self
            .post_token(&params)
            .await
            .map_err(|failure| match failure {
                TokenFailure::Rejected(err) => AuthApiError::Unauthorized(format!(
                    "Token exchange failed: {}",
                    err.error_description
                        .as_deref()
                        .unwrap_or("Unknown error")
                )),
                TokenFailure::Api(err) => err,
            })?;

        tracing::info!("Token exchange successful");
        Ok(tokens)
    }

    /// Obtain a fresh token set from a refresh token.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the refresh token is expired or invalid,
    /// `UpstreamUnavailable` when the provider cannot be reached in time.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthApiError> {
        tracing::info!("Attempting token refresh");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
        ];

        let tokens = self
            .post_token(&params)
            .await
            .map_err(|failure| match failure {
                TokenFailure::Rejected(_) => {
                    AuthApiError::Unauthorized("Refresh token expired or invalid".to_string())
                }
                TokenFailure::Api(err) => err,
            })?;

        tracing::info!("Token refresh successful");
        Ok(tokens)
    }

    /// Revoke a refresh token. Never fails; the outcome is only logged and
    /// reported.
    pub async fn revoke(&self, refresh_token: &str) -> RevokeOutcome {
        tracing::info!("Attempting token revocation for logout");

        let params = [
            ("token", refresh_token),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
        ];

        match self
            .http_client
            .post(self.settings.revoke_url())
            .form(&params)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::info!("Token revocation successful");
                RevokeOutcome::Revoked
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Token revocation refused");
                RevokeOutcome::Refused
            }
            Err(e) => {
                tracing::error!(error = %e, "Error during logout");
                RevokeOutcome::Failed
            }
        }
    }

    async fn post_token(&self, params: &[(&str, &str)]) -> Result<TokenSet, TokenFailure> {
        let response = self
            .http_client
            .post(self.settings.token_url())
            .form(params)
            .send()
            .await
            .map_err(|e| TokenFailure::Api(transport_error(&e)))?;

        let status = response.status();
        tracing::debug!(status = %status, "Token endpoint responded");

        if !status.is_success() {
            let err: ProviderError = response.json().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                error = err.error.as_deref().unwrap_or("unknown_error"),
                "Token request rejected"
            );
            return Err(TokenFailure::Rejected(err));
        }

        response.json::<TokenSet>().await.map_err(|e| {
            TokenFailure::Api(AuthApiError::Internal(format!(
                "Unexpected token response: {e}"
            )))
        })
    }
}

enum TokenFailure {
    Rejected(ProviderError),
    Api(AuthApiError),
}

fn transport_error(e: &reqwest::Error) -> AuthApiError {
    if e.is_timeout() {
        tracing::error!("Identity provider not responding");
        AuthApiError::UpstreamUnavailable(
            "Authentication server not responding. Please try again later.".to_string(),
        )
    } else {
        tracing::error!(error = %e, "Identity provider request failed");
        AuthApiError::UpstreamUnavailable(
            "Failed to connect to authentication server".to_string(),
        )
    }
}
