//! Field-level checks for access request payloads.

use std::net::IpAddr;

use crate::error::{PortalError, Result};

/// Parse `value` as an IPv4 or IPv6 literal.
pub fn validate_ip(field: &str, value: &str) -> Result<IpAddr> {
    value
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| PortalError::validation(field, "Invalid IP address"))
}

/// Check that `port` lies in `1..=65535` and narrow it.
pub fn validate_port(port: i64) -> Result<u16> {
    match u16::try_from(port) {
        Ok(p) if p >= 1 => Ok(p),
        _ => Err(PortalError::validation(
            "port",
            "Port must be between 1 and 65535",
        )),
    }
}

/// Require non-blank text.
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PortalError::validation(field, "Must not be empty"));
    }
    Ok(())
}
