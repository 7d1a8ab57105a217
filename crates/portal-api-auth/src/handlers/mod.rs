//! HTTP handlers for the authentication endpoints.

pub mod me;
pub mod token;

pub use me::me_handler;
pub use token::{exchange_token_handler, logout_handler, refresh_token_handler};
