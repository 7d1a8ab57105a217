//! Axum extractors for portal handlers.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use portal_auth::PortalClaims;
use portal_core::Principal;
use portal_db::User;

use crate::error::ApiError;
use crate::router::ApiState;

/// Maximum User-Agent length stored in audit logs.
const MAX_USER_AGENT_LEN: usize = 512;

const UNKNOWN: &str = "unknown";

/// Client details recorded on audit entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub ip_address: String,
    pub user_agent: String,
}

impl RequestContext {
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Build from headers, falling back to the socket peer address.
    ///
    /// X-Forwarded-For is only meaningful behind a proxy that overwrites it;
    /// the value is used for audit records only. An entry that is not an IP
    /// address is ignored.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(parse_forwarded_ip);

        let ip_address = forwarded
            .or_else(|| peer.map(|addr| addr.ip()))
            .map_or_else(|| UNKNOWN.to_string(), |ip| ip.to_string());

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.chars().take(MAX_USER_AGENT_LEN).collect())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            ip_address,
            user_agent,
        }
    }
}

/// Accepts a bare address or one with a port (`203.0.113.7:443`, `[::1]:80`).
fn parse_forwarded_ip(entry: &str) -> Option<IpAddr> {
    let entry = entry.trim();
    entry
        .parse::<IpAddr>()
        .ok()
        .or_else(|| entry.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_headers(&parts.headers, peer))
    }
}

/// The authenticated caller: their user row and capabilities.
///
/// Requires `jwt_auth_middleware` to have stored `PortalClaims`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub principal: Principal,
}

#[async_trait]
impl FromRequestParts<ApiState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<PortalClaims>()
            .ok_or(ApiError::Unauthorized)?;

        let (user, principal) = state.user_service.resolve(claims).await?;
        Ok(Self { user, principal })
    }
}
