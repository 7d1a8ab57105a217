//! Database models.

pub mod access_request;
pub mod audit_log;
pub mod configuration;
pub mod user;

pub use access_request::{
    escape_like, AccessRequest, AccessRequestChanges, AccessRequestFilter, AccessRequestStatus,
    NetworkProtocol, NewAccessRequest, REQUEST_NUMBER_CONSTRAINT,
};
pub use audit_log::{AuditAction, AuditLog, AuditResourceType, NewAuditLog};
pub use configuration::Configuration;
pub use user::{
    UpdateUser, UpsertUser, User, UserRole, EMAIL_CONSTRAINT, USERNAME_CONSTRAINT,
};
