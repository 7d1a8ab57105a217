//! Bearer token verification for the access portal.
//!
//! This crate provides:
//! - The claim set issued by the identity provider (`PortalClaims`)
//! - RS256 decoding with expiry, issuer and audience checks
//! - JWKS fetching with caching and re-fetch on unknown `kid`
//! - `TokenVerifier`, which ties a key source to a validation policy
//!
//! # Example
//!
//! ```rust,ignore
//! use portal_auth::{JwksClient, TokenVerifier, ValidationConfig};
//!
//! let jwks = JwksClient::new("https://idp.example.com/realms/corp/protocol/openid-connect/certs")?;
//! let verifier = TokenVerifier::jwks(jwks, ValidationConfig::default().issuer("https://idp.example.com/realms/corp"));
//!
//! let claims = verifier.verify(&bearer_token).await?;
//! println!("{:?}", claims.capabilities());
//! ```

mod claims;
mod error;
mod jwks;
mod jwt;
mod verifier;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_keys;

// Re-export public API
pub use claims::{Audience, PortalClaims, PortalClaimsBuilder, RealmAccess};
pub use error::AuthError;
pub use jwks::{Jwk, JwkSet, JwksClient};
pub use jwt::{
    decode_token, decode_token_with_config, decode_token_with_key, encode_token,
    encode_token_with_kid, extract_kid, ValidationConfig,
};
pub use verifier::{KeySource, TokenVerifier};
