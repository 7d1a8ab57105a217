//! Request and response models for the portal API.

pub mod access_request;
pub mod audit;
pub mod configuration;
pub mod user;

pub use access_request::{
    AccessRequestResponse, AccessRequestSearchResponse, ApproveAccessRequest, CreateAccessRequest,
    RejectAccessRequest, SearchRequestsQuery, UpdateAccessRequest, DEFAULT_SEARCH_LIMIT,
    MAX_SEARCH_LIMIT,
};
pub use audit::{ListAuditQuery, MAX_AUDIT_LIMIT};
pub use configuration::{PublicConfig, UpsertConfigRequest};
pub use user::{
    AdminUpdateUserRequest, ListUsersQuery, StatsResponse, UpdateProfileRequest,
    DEFAULT_USER_LIMIT, MAX_USER_LIMIT,
};
