//! Business services for the portal API.

pub mod access_request_service;
pub mod admin_service;
pub mod audit_service;
pub mod configuration_service;
pub mod user_service;

pub use access_request_service::AccessRequestService;
pub use admin_service::AdminService;
pub use audit_service::{AuditRecord, AuditService};
pub use configuration_service::ConfigurationService;
pub use user_service::{role_for, UserService};
