//! Services for the authentication endpoints.

pub mod idp_client;

pub use idp_client::{IdpClient, IdpSettings, RevokeOutcome};
