//! Claims carried by identity provider access tokens.
//!
//! Besides the RFC 7519 registered claims, tokens carry OpenID Connect
//! profile claims and role claims. Roles appear either in a top-level
//! `roles` array or nested under `realm_access.roles`; both are honoured.

use chrono::{Duration, Utc};
use portal_core::Capability;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The `aud` claim, which may be a single string or an array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    #[must_use]
    pub fn contains(&self, aud: &str) -> bool {
        match self {
            Self::One(a) => a == aud,
            Self::Many(list) => list.iter().any(|a| a == aud),
        }
    }
}

/// Realm-level role container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Verified access token claims.
///
/// # Registered Claims (RFC 7519)
///
/// - `sub`: Subject, the identity provider's stable user id
/// - `iss`: Issuer
/// - `aud`: Audience
/// - `exp`: Expiration time (Unix timestamp)
/// - `iat`: Issued at (Unix timestamp)
/// - `jti`: Token id
///
/// # Profile Claims
///
/// - `preferred_username`, `email`, `given_name`, `family_name`, `name`
///
/// # Role Claims
///
/// - `roles`, `realm_access.roles`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortalClaims {
    pub sub: String,

    #[serde(default)]
    pub iss: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    pub exp: i64,

    #[serde(default)]
    pub iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<RealmAccess>,
}

impl PortalClaims {
    /// Create a new builder for constructing claims.
    #[must_use]
    pub fn builder() -> PortalClaimsBuilder {
        PortalClaimsBuilder::default()
    }

    /// Check if the token is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// All role strings, top-level first, then realm roles.
    pub fn all_roles(&self) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .chain(self.realm_access.iter().flat_map(|r| r.roles.iter()))
            .map(String::as_str)
    }

    /// Check if the claims contain a specific role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.all_roles().any(|r| r == role)
    }

    /// Check if the claims contain any of the specified roles.
    #[must_use]
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }

    /// Portal capabilities granted by the role claims. Unknown roles are
    /// ignored and the result is sorted and free of duplicates.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut caps: Vec<Capability> = self.all_roles().filter_map(Capability::from_role).collect();
        caps.sort();
        caps.dedup();
        caps
    }

    /// Display name: `name`, else given and family name, else username.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_ref().filter(|n| !n.is_empty()) {
            return Some(name.clone());
        }
        match (&self.given_name, &self.family_name) {
            (Some(g), Some(f)) => Some(format!("{g} {f}")),
            (Some(g), None) => Some(g.clone()),
            (None, Some(f)) => Some(f.clone()),
            (None, None) => self.preferred_username.clone(),
        }
    }
}

/// Builder for constructing [`PortalClaims`].
#[derive(Debug, Default)]
pub struct PortalClaimsBuilder {
    sub: Option<String>,
    iss: Option<String>,
    aud: Option<Audience>,
    exp: Option<i64>,
    iat: Option<i64>,
    jti: Option<String>,
    preferred_username: Option<String>,
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    name: Option<String>,
    roles: Vec<String>,
    realm_roles: Vec<String>,
}

impl PortalClaimsBuilder {
    #[must_use]
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    #[must_use]
    pub fn audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Some(Audience::One(aud.into()));
        self
    }

    /// Set the expiration time (Unix timestamp).
    #[must_use]
    pub fn expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    #[must_use]
    pub fn expires_in_secs(mut self, secs: i64) -> Self {
        self.exp = Some(Utc::now().timestamp() + secs);
        self
    }

    #[must_use]
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.exp = Some((Utc::now() + duration).timestamp());
        self
    }

    #[must_use]
    pub fn issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    #[must_use]
    pub fn jwt_id(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.preferred_username = Some(username.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn given_name(mut self, given_name: impl Into<String>) -> Self {
        self.given_name = Some(given_name.into());
        self
    }

    #[must_use]
    pub fn family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the top-level `roles` claim.
    #[must_use]
    pub fn roles(mut self, roles: Vec<impl Into<String>>) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Set `realm_access.roles`.
    #[must_use]
    pub fn realm_roles(mut self, roles: Vec<impl Into<String>>) -> Self {
        self.realm_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Build the claims.
    ///
    /// Defaults: `exp` one hour from now, `iat` now, `jti` a new UUID v4.
    #[must_use]
    pub fn build(self) -> PortalClaims {
        let now = Utc::now().timestamp();

        PortalClaims {
            sub: self.sub.unwrap_or_default(),
            iss: self.iss.unwrap_or_default(),
            aud: self.aud,
            exp: self.exp.unwrap_or(now + 3600),
            iat: self.iat.unwrap_or(now),
            jti: Some(self.jti.unwrap_or_else(|| Uuid::new_v4().to_string())),
            preferred_username: self.preferred_username,
            email: self.email,
            given_name: self.given_name,
            family_name: self.family_name,
            name: self.name,
            roles: self.roles,
            realm_access: (!self.realm_roles.is_empty()).then(|| RealmAccess {
                roles: self.realm_roles,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let claims = PortalClaims::builder()
            .subject("kc-123")
            .issuer("https://idp.example.com/realms/corp")
            .username("alice")
            .expires_in_secs(600)
            .build();

        assert_eq!(claims.sub, "kc-123");
        assert_eq!(claims.preferred_username.as_deref(), Some("alice"));
        assert!(claims.jti.is_some());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_roles_from_both_locations() {
        let claims = PortalClaims::builder()
            .roles(vec!["approver"])
            .realm_roles(vec!["offline_access", "admin"])
            .build();

        assert!(claims.has_role("approver"));
        assert!(claims.has_role("admin"));
        assert!(claims.has_any_role(&["nope", "offline_access"]));
        assert_eq!(
            claims.capabilities(),
            vec![Capability::Approver, Capability::Admin]
        );
    }

    #[test]
    fn test_capabilities_dedup_and_unknown() {
        let claims = PortalClaims::builder()
            .roles(vec!["user", "user", "uma_authorization"])
            .build();
        assert_eq!(claims.capabilities(), vec![Capability::User]);
    }

    #[test]
    fn test_deserialize_provider_token_shape() {
        let json = serde_json::json!({
            "sub": "f1c2",
            "iss": "https://idp/realms/corp",
            "aud": ["account", "portal"],
            "exp": 4_102_444_800_i64,
            "iat": 1_700_000_000_i64,
            "preferred_username": "bob",
            "email": "bob@example.com",
            "given_name": "Bob",
            "family_name": "Builder",
            "realm_access": { "roles": ["approver"] }
        });

        let claims: PortalClaims = serde_json::from_value(json).unwrap();
        assert_eq!(claims.aud, Some(Audience::Many(vec!["account".into(), "portal".into()])));
        assert!(claims.aud.as_ref().unwrap().contains("portal"));
        assert!(claims.roles.is_empty());
        assert_eq!(claims.capabilities(), vec![Capability::Approver]);
        assert_eq!(claims.display_name().as_deref(), Some("Bob Builder"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let claims = PortalClaims::builder().name("Full Name").given_name("x").build();
        assert_eq!(claims.display_name().as_deref(), Some("Full Name"));

        let claims = PortalClaims::builder().username("carol").build();
        assert_eq!(claims.display_name().as_deref(), Some("carol"));
    }

    #[test]
    fn test_expired() {
        let claims = PortalClaims::builder()
            .expiration(Utc::now().timestamp() - 10)
            .build();
        assert!(claims.is_expired());
    }
}
