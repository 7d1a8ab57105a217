//! Token verification against a key source and validation policy.

use jsonwebtoken::DecodingKey;

use crate::claims::PortalClaims;
use crate::error::AuthError;
use crate::jwks::JwksClient;
use crate::jwt::{decode_token_with_key, extract_kid, ValidationConfig};

/// Where verification keys come from.
#[derive(Clone)]
pub enum KeySource {
    /// The identity provider's JWKS endpoint.
    Jwks(JwksClient),
    /// A single fixed public key.
    Static(DecodingKey),
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jwks(client) => f.debug_tuple("Jwks").field(client).finish(),
            Self::Static(_) => f.write_str("Static(..)"),
        }
    }
}

/// Verifies bearer tokens. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    source: KeySource,
    config: ValidationConfig,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(source: KeySource, config: ValidationConfig) -> Self {
        Self { source, config }
    }

    /// Verifier backed by a JWKS endpoint.
    #[must_use]
    pub fn jwks(client: JwksClient, config: ValidationConfig) -> Self {
        Self::new(KeySource::Jwks(client), config)
    }

    /// Verifier backed by a PEM encoded RSA public key.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidKey` if the PEM cannot be parsed.
    pub fn from_public_key_pem(pem: &[u8], config: ValidationConfig) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| AuthError::InvalidKey(format!("Invalid public key: {e}")))?;
        Ok(Self::new(KeySource::Static(key), config))
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Verify signature, expiry and the configured issuer/audience, then
    /// return the claims.
    pub async fn verify(&self, token: &str) -> Result<PortalClaims, AuthError> {
        match &self.source {
            KeySource::Static(key) => decode_token_with_key(token, key, &self.config),
            KeySource::Jwks(client) => {
                let jwk = match extract_kid(token)? {
                    Some(kid) => client.get_key(&kid).await?,
                    None => client.get_default_key().await?,
                };
                decode_token_with_key(token, &jwk.decoding_key()?, &self.config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{encode_token, encode_token_with_kid};
    use crate::test_keys::{
        tamper_signature, test_jwks_json, TEST_KID, TEST_PRIVATE_KEY, TEST_PUBLIC_KEY,
    };
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn claims() -> PortalClaims {
        PortalClaims::builder()
            .subject("kc-1")
            .issuer("https://idp/realms/corp")
            .username("dave")
            .expires_in_secs(300)
            .build()
    }

    async fn jwks_verifier() -> (MockServer, TokenVerifier) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/certs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(test_jwks_json()))
            .mount(&server)
            .await;
        let client = JwksClient::new(format!("{}/certs", server.uri())).unwrap();
        let verifier = TokenVerifier::jwks(
            client,
            ValidationConfig::default().issuer("https://idp/realms/corp"),
        );
        (server, verifier)
    }

    #[tokio::test]
    async fn test_static_key_verifies() {
        let verifier =
            TokenVerifier::from_public_key_pem(TEST_PUBLIC_KEY, ValidationConfig::default())
                .unwrap();
        let token = encode_token(&claims(), TEST_PRIVATE_KEY).unwrap();
        let verified = verifier.verify(&token).await.unwrap();
        assert_eq!(verified.sub, "kc-1");
    }

    #[tokio::test]
    async fn test_static_key_rejects_tampered() {
        let verifier =
            TokenVerifier::from_public_key_pem(TEST_PUBLIC_KEY, ValidationConfig::default())
                .unwrap();
        let token = encode_token(&claims(), TEST_PRIVATE_KEY).unwrap();
        let err = verifier.verify(&tamper_signature(&token)).await.unwrap_err();
        assert!(err.is_invalid_signature());
    }

    #[tokio::test]
    async fn test_jwks_with_kid() {
        let (_server, verifier) = jwks_verifier().await;
        let token = encode_token_with_kid(&claims(), TEST_PRIVATE_KEY, TEST_KID).unwrap();
        let verified = verifier.verify(&token).await.unwrap();
        assert_eq!(verified.preferred_username.as_deref(), Some("dave"));
    }

    #[tokio::test]
    async fn test_jwks_without_kid_uses_default_key() {
        let (_server, verifier) = jwks_verifier().await;
        let token = encode_token(&claims(), TEST_PRIVATE_KEY).unwrap();
        assert!(verifier.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_jwks_unknown_kid() {
        let (_server, verifier) = jwks_verifier().await;
        let token = encode_token_with_kid(&claims(), TEST_PRIVATE_KEY, "other").unwrap();
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::KeyNotFound(_)));
    }

    #[tokio::test]
    async fn test_jwks_wrong_issuer() {
        let (_server, verifier) = jwks_verifier().await;
        let foreign = PortalClaims::builder()
            .subject("kc-1")
            .issuer("https://elsewhere")
            .build();
        let token = encode_token_with_kid(&foreign, TEST_PRIVATE_KEY, TEST_KID).unwrap();
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::WrongIssuerOrAudience(_)));
    }

    #[test]
    fn test_invalid_pem() {
        let err = TokenVerifier::from_public_key_pem(b"nope", ValidationConfig::default())
            .unwrap_err();
        assert!(err.is_key_error());
    }
}
