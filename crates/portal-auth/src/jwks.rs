//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! The identity provider publishes its signing keys at a JWKS endpoint and
//! rotates them from time to time. Keys are cached for a TTL and the set is
//! re-fetched once when a token names a `kid` the cache does not know.

use crate::error::AuthError;
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// A JSON Web Key as defined in RFC 7517.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (e.g., "RSA").
    pub kty: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Public key use (e.g., "sig" for signature).
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// RSA modulus (`Base64URL` encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA exponent (`Base64URL` encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl Jwk {
    /// Whether this key can verify RS256 signatures.
    #[must_use]
    pub fn is_rsa_signing_key(&self) -> bool {
        self.kty == "RSA"
            && self.key_use.as_deref().map_or(true, |u| u == "sig")
            && self.alg.as_deref().map_or(true, |a| a == "RS256")
    }

    /// Build a decoding key from the RSA components.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidKey` if the key is not RSA or its
    /// components are missing or malformed.
    pub fn decoding_key(&self) -> Result<DecodingKey, AuthError> {
        if self.kty != "RSA" {
            return Err(AuthError::InvalidKey(format!(
                "Unsupported key type: {}",
                self.kty
            )));
        }
        let n = self
            .n
            .as_deref()
            .ok_or_else(|| AuthError::InvalidKey("Missing modulus (n)".to_string()))?;
        let e = self
            .e
            .as_deref()
            .ok_or_else(|| AuthError::InvalidKey("Missing exponent (e)".to_string()))?;

        DecodingKey::from_rsa_components(n, e)
            .map_err(|err| AuthError::InvalidKey(format!("Invalid RSA components: {err}")))
    }
}

/// A JSON Web Key Set as defined in RFC 7517.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find a key by its kid.
    #[must_use]
    pub fn find_key(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }

    /// First RS256 signing key, for tokens without a `kid` header.
    #[must_use]
    pub fn first_signing_key(&self) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.is_rsa_signing_key())
    }
}

struct CachedJwks {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// JWKS client with caching support.
///
/// # Example
///
/// ```rust,ignore
/// use portal_auth::JwksClient;
///
/// let client = JwksClient::new("https://idp.example.com/realms/corp/protocol/openid-connect/certs")?;
/// let key = client.get_key("key-1").await?;
/// ```
#[derive(Clone)]
pub struct JwksClient {
    url: String,
    cache: Arc<RwLock<Option<CachedJwks>>>,
    cache_ttl: Duration,
    http_client: reqwest::Client,
}

impl JwksClient {
    /// Create a new JWKS client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::JwksFetchFailed` if the HTTP client cannot be created.
    pub fn new(url: impl Into<String>) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AuthError::JwksFetchFailed(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            url: url.into(),
            cache: Arc::new(RwLock::new(None)),
            cache_ttl: Duration::from_secs(300),
            http_client,
        })
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch JWKS from the endpoint and refresh the cache.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::JwksFetchFailed` if the fetch fails.
    pub async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        tracing::debug!(url = %self.url, "Fetching JWKS");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetchFailed(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::JwksFetchFailed(format!(
                "HTTP {}: {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::JwksFetchFailed(format!("Invalid JSON: {e}")))?;

        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });

        Ok(jwks)
    }

    /// Get JWKS, using the cache if it is still fresh.
    pub async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        self.fetch_jwks().await
    }

    /// Get a key by kid, re-fetching once on a cache miss.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeyNotFound` if the key is not found after re-fetch.
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let jwks = self.get_jwks().await?;
        if let Some(key) = jwks.find_key(kid) {
            return Ok(key.clone());
        }

        tracing::info!(kid = %kid, "Unknown kid, re-fetching JWKS");
        let jwks = self.fetch_jwks().await?;
        jwks.find_key(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }

    /// Get the first signing key, for tokens without a `kid`.
    pub async fn get_default_key(&self) -> Result<Jwk, AuthError> {
        let jwks = self.get_jwks().await?;
        jwks.first_signing_key()
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound("<no kid>".to_string()))
    }

    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }
}

impl std::fmt::Debug for JwksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksClient")
            .field("url", &self.url)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}
