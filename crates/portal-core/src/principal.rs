//! Authenticated principals and the permission rules attached to them.
//!
//! Capabilities are granted by the identity provider through role claims.
//! All permission decisions for access requests and audit logs are made
//! here so that they can be enforced independent of the HTTP layer.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PortalError, Result};

/// A capability granted to a principal.
///
/// Ordered from least to most privileged so that the highest capability of
/// a set is simply its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    User,
    Approver,
    Admin,
}

impl Capability {
    /// Wire name of this capability, identical to the role claim value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Approver => "approver",
            Self::Admin => "admin",
        }
    }

    /// Map a role claim to a capability. Unknown roles yield `None`.
    #[must_use]
    pub fn from_role(role: &str) -> Option<Self> {
        role.parse().ok()
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "approver" => Ok(Self::Approver),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown capability: {other}")),
        }
    }
}

/// An authenticated actor.
///
/// `user_id` is the portal's own user row id, `subject` the identity
/// provider's subject id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub subject: String,
    pub username: String,
    capabilities: BTreeSet<Capability>,
}

impl Principal {
    /// Build a principal. Every authenticated principal holds at least
    /// [`Capability::User`].
    pub fn new(
        user_id: Uuid,
        subject: impl Into<String>,
        username: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        let mut capabilities: BTreeSet<Capability> = capabilities.into_iter().collect();
        capabilities.insert(Capability::User);
        Self {
            user_id,
            subject: subject.into(),
            username: username.into(),
            capabilities,
        }
    }

    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has(Capability::Admin)
    }

    /// Capabilities held, in ascending privilege order.
    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.capabilities.iter().copied()
    }

    /// The most privileged capability held.
    #[must_use]
    pub fn highest_capability(&self) -> Capability {
        self.capabilities
            .iter()
            .next_back()
            .copied()
            .unwrap_or(Capability::User)
    }

    /// Whether this principal may approve or reject access requests.
    #[must_use]
    pub fn can_decide(&self) -> bool {
        self.has(Capability::Approver) || self.is_admin()
    }

    /// Whether this principal may read a request owned by `owner_id`.
    #[must_use]
    pub fn can_view_request(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_admin()
    }

    /// Whether request searches are unscoped for this principal.
    #[must_use]
    pub fn sees_all_requests(&self) -> bool {
        self.can_decide()
    }

    /// Whether audit listings are unscoped for this principal.
    #[must_use]
    pub fn sees_all_audit(&self) -> bool {
        self.is_admin()
    }

    /// Fails with `Forbidden` unless this principal may approve or reject.
    pub fn require_decider(&self) -> Result<()> {
        if self.can_decide() {
            Ok(())
        } else {
            Err(PortalError::Forbidden(
                "Approver or admin role required".to_string(),
            ))
        }
    }

    /// Fails with `Forbidden` unless this principal is an admin.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(PortalError::Forbidden("Admin role required".to_string()))
        }
    }

    /// Fails with `Forbidden` unless this principal owns the resource.
    pub fn require_owner(&self, owner_id: Uuid) -> Result<()> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            Err(PortalError::Forbidden(
                "Only the owner may modify this request".to_string(),
            ))
        }
    }

    /// Fails with `Forbidden` unless [`Self::can_view_request`] holds.
    pub fn require_view(&self, owner_id: Uuid) -> Result<()> {
        if self.can_view_request(owner_id) {
            Ok(())
        } else {
            Err(PortalError::Forbidden(
                "Not authorized to view this request".to_string(),
            ))
        }
    }

    /// Owner filter to apply to request searches, `None` when unscoped.
    #[must_use]
    pub fn request_scope(&self) -> Option<Uuid> {
        (!self.sees_all_requests()).then_some(self.user_id)
    }

    /// Acting-user filter to apply to audit listings, `None` when unscoped.
    #[must_use]
    pub fn audit_scope(&self) -> Option<Uuid> {
        (!self.sees_all_audit()).then_some(self.user_id)
    }
}
