//! JWT encoding and decoding with the RS256 algorithm.
//!
//! Decoding always verifies the signature and, unless disabled, the
//! expiry. Issuer and audience are checked when configured.

use crate::claims::PortalClaims;
use crate::error::AuthError;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};

/// Configuration for JWT validation.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Leeway in seconds for exp/iat validation (clock skew tolerance).
    pub leeway: u64,
    /// Expected issuer (if set, tokens with different issuer are rejected).
    pub issuer: Option<String>,
    /// Expected audience (if set, tokens without matching audience are rejected).
    pub audience: Option<Vec<String>>,
    /// Whether to validate expiration.
    pub validate_exp: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            leeway: 60,
            issuer: None,
            audience: None,
            validate_exp: true,
        }
    }
}

impl ValidationConfig {
    #[must_use]
    pub fn with_leeway(leeway: u64) -> Self {
        Self {
            leeway,
            ..Default::default()
        }
    }

    /// Set the expected issuer.
    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.issuer = Some(iss.into());
        self
    }

    /// Set the accepted audiences.
    #[must_use]
    pub fn audience(mut self, aud: Vec<impl Into<String>>) -> Self {
        self.audience = Some(aud.into_iter().map(Into::into).collect());
        self
    }

    /// Disable expiration validation. Only meant for tests.
    #[must_use]
    pub fn skip_exp_validation(mut self) -> Self {
        self.validate_exp = false;
        self
    }

    fn to_validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = self.leeway;
        validation.validate_exp = self.validate_exp;
        validation.algorithms = vec![Algorithm::RS256];

        if let Some(ref iss) = self.issuer {
            validation.set_issuer(&[iss]);
        }

        if let Some(ref aud) = self.audience {
            validation.set_audience(aud);
        } else {
            validation.validate_aud = false;
        }

        validation
    }
}

/// Encode claims into a signed RS256 token.
///
/// # Errors
///
/// Returns `AuthError::InvalidKey` if the private key is invalid.
pub fn encode_token(claims: &PortalClaims, private_key_pem: &[u8]) -> Result<String, AuthError> {
    sign(claims, private_key_pem, Header::new(Algorithm::RS256))
}

/// Encode claims with a key id (`kid`) header.
pub fn encode_token_with_kid(
    claims: &PortalClaims,
    private_key_pem: &[u8],
    kid: &str,
) -> Result<String, AuthError> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    sign(claims, private_key_pem, header)
}

fn sign(claims: &PortalClaims, private_key_pem: &[u8], header: Header) -> Result<String, AuthError> {
    let key = EncodingKey::from_rsa_pem(private_key_pem)
        .map_err(|e| AuthError::InvalidKey(format!("Invalid private key: {e}")))?;

    encode(&header, claims, &key)
        .map_err(|e| AuthError::InvalidToken(format!("Encoding failed: {e}")))
}

/// Decode and validate a token against a PEM public key with default
/// validation.
///
/// # Errors
///
/// - `AuthError::TokenExpired` - Token has expired
/// - `AuthError::InvalidSignature` - Signature verification failed
/// - `AuthError::InvalidToken` - Token format is invalid
/// - `AuthError::InvalidAlgorithm` - Token uses unsupported algorithm
/// - `AuthError::InvalidKey` - Public key is invalid
pub fn decode_token(token: &str, public_key_pem: &[u8]) -> Result<PortalClaims, AuthError> {
    decode_token_with_config(token, public_key_pem, &ValidationConfig::default())
}

/// Decode and validate a token against a PEM public key.
pub fn decode_token_with_config(
    token: &str,
    public_key_pem: &[u8],
    config: &ValidationConfig,
) -> Result<PortalClaims, AuthError> {
    let key = DecodingKey::from_rsa_pem(public_key_pem)
        .map_err(|e| AuthError::InvalidKey(format!("Invalid public key: {e}")))?;

    decode_token_with_key(token, &key, config)
}

/// Decode and validate a token against an already built decoding key.
pub fn decode_token_with_key(
    token: &str,
    key: &DecodingKey,
    config: &ValidationConfig,
) -> Result<PortalClaims, AuthError> {
    let token_data: TokenData<PortalClaims> =
        decode(token, key, &config.to_validation()).map_err(map_jwt_error)?;

    Ok(token_data.claims)
}

/// Extract the key id (`kid`) from a token header without validation.
pub fn extract_kid(token: &str) -> Result<Option<String>, AuthError> {
    let header = jsonwebtoken::decode_header(token)
        .map_err(|e| AuthError::InvalidToken(format!("Invalid token header: {e}")))?;

    Ok(header.kid)
}

/// Map jsonwebtoken errors to `AuthError`.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::InvalidAlgorithm,
        ErrorKind::InvalidIssuer => AuthError::WrongIssuerOrAudience("issuer".to_string()),
        ErrorKind::InvalidAudience => AuthError::WrongIssuerOrAudience("audience".to_string()),
        ErrorKind::InvalidToken => AuthError::InvalidToken("Malformed token".to_string()),
        ErrorKind::Base64(_) => AuthError::InvalidToken("Invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => AuthError::InvalidToken("Invalid JSON in claims".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.to_string()),
        _ => AuthError::InvalidToken(format!("Token validation failed: {err}")),
    }
}
