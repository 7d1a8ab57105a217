//! Error types for token verification.

use thiserror::Error;

/// Authentication error types.
///
/// Each variant maps to a specific failure mode while verifying a bearer
/// token. All of them surface to clients as `401 Unauthorized`.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // JWT errors
    /// Token has expired (exp claim is in the past).
    #[error("Token has expired")]
    TokenExpired,

    /// Token signature is invalid.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token format is malformed or invalid.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token uses an unsupported algorithm (only RS256 is allowed).
    #[error("Unsupported algorithm: only RS256 is allowed")]
    InvalidAlgorithm,

    /// Issuer or audience did not match the configured values.
    #[error("Token not intended for this service: {0}")]
    WrongIssuerOrAudience(String),

    /// Required claim is missing from token.
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    // JWKS errors
    /// Failed to fetch JWKS from endpoint.
    #[error("JWKS fetch failed: {0}")]
    JwksFetchFailed(String),

    /// Key with specified kid not found in JWKS.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    // Key errors
    /// RSA key is invalid or malformed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl AuthError {
    /// Check if this error indicates an expired token.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::TokenExpired)
    }

    /// Check if this error indicates an invalid signature.
    #[must_use]
    pub fn is_invalid_signature(&self) -> bool {
        matches!(self, AuthError::InvalidSignature)
    }

    /// Check if this error is caused by the presented token itself.
    #[must_use]
    pub fn is_jwt_error(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired
                | AuthError::InvalidSignature
                | AuthError::InvalidToken(_)
                | AuthError::InvalidAlgorithm
                | AuthError::WrongIssuerOrAudience(_)
                | AuthError::MissingClaim(_)
        )
    }

    /// Check if this error is caused by the key set rather than the token.
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            AuthError::JwksFetchFailed(_) | AuthError::KeyNotFound(_) | AuthError::InvalidKey(_)
        )
    }
}
