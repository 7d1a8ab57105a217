//! Error Types
//!
//! Standardized error taxonomy shared by the access request lifecycle,
//! the permission checks and the HTTP layer.
//!
//! # Example
//!
//! ```
//! use portal_core::{PortalError, Result};
//!
//! fn find_request(id: &str) -> Result<String> {
//!     if id.is_empty() {
//!         return Err(PortalError::NotFound {
//!             resource: "Access request".to_string(),
//!             id: None,
//!         });
//!     }
//!     Ok(format!("request {id}"))
//! }
//! ```

use thiserror::Error;

/// Domain error for the access portal.
///
/// Every variant maps to exactly one HTTP status code, see
/// [`PortalError::status_code`].
///
/// # Variants
///
/// - `Validation` - malformed input (HTTP 422)
/// - `NotFound` - unknown identifier (HTTP 404)
/// - `Forbidden` - authenticated but not permitted (HTTP 403)
/// - `InvalidState` - operation illegal for the current status (HTTP 400)
/// - `Unauthenticated` - missing or invalid token (HTTP 401)
/// - `Storage` - persistence failure (HTTP 500)
/// - `UpstreamUnavailable` - identity provider unreachable (HTTP 503)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PortalError {
    /// Input validation failure.
    #[error("Validation error on field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// Requested resource was not found.
    #[error("{resource} not found{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    NotFound {
        /// The type of resource that was not found (e.g., "User", "Access request")
        resource: String,
        /// Optional identifier of the resource
        id: Option<String>,
    },

    /// The principal is authenticated but lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation is not legal for the resource's current status.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Missing or invalid credentials.
    #[error("Unauthenticated{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Unauthenticated {
        /// Optional message providing more context
        message: Option<String>,
    },

    /// Persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The identity provider could not be reached or timed out.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl PortalError {
    /// Shorthand for a field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a missing resource with a known identifier.
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: Some(id.to_string()),
        }
    }

    /// HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 422,
            Self::NotFound { .. } => 404,
            Self::Forbidden(_) => 403,
            Self::InvalidState(_) => 400,
            Self::Unauthenticated { .. } => 401,
            Self::Storage(_) => 500,
            Self::UpstreamUnavailable(_) => 503,
        }
    }

    /// Stable machine-readable code for client handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidState(_) => "invalid_state",
            Self::Unauthenticated { .. } => "unauthorized",
            Self::Storage(_) => "storage_error",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
        }
    }

    /// Check if this error is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a permission failure.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    /// Check if this error is a status precondition failure.
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Type alias for Results using `PortalError`.
pub type Result<T> = std::result::Result<T, PortalError>;
