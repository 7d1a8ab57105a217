//! HTTP handlers for the portal API.

pub mod access_requests;
pub mod admin;
pub mod audit;
pub mod configuration;
pub mod users;
