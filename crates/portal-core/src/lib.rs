//! Network access portal core library
//!
//! Shared, I/O free building blocks used by every other portal crate.
//!
//! # Modules
//!
//! - [`error`] - Standardized error taxonomy (`PortalError`)
//! - [`principal`] - Capabilities and the permission rules attached to them
//! - [`validation`] - Field-level checks for access request payloads
//! - [`request_number`] - Human-readable request number generation
//!
//! # Example
//!
//! ```
//! use portal_core::{Capability, Principal};
//! use uuid::Uuid;
//!
//! let approver = Principal::new(Uuid::new_v4(), "sub-1", "alice", [Capability::Approver]);
//! assert!(approver.can_decide());
//! assert!(!approver.sees_all_audit());
//! ```

pub mod error;
pub mod principal;
pub mod request_number;
pub mod validation;

pub use error::{PortalError, Result};
pub use principal::{Capability, Principal};
pub use request_number::generate_request_number;
pub use validation::{require_text, validate_ip, validate_port};
