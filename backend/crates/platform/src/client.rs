//! Client identification utilities
//!
//! Who initiated a payment is recorded in logs only; nothing here is used
//! for authorization.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Request origin details used for audit logging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client IP address (from X-Forwarded-For or direct connection)
    pub ip: Option<IpAddr>,
    /// User-Agent header, if present
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// IP as string, or `"unknown"`
    pub fn ip_display(&self) -> String {
        self.ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}

/// Collect [`ClientInfo`] from request headers
pub fn extract_client_info(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> ClientInfo {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.to_string());

    ClientInfo {
        ip: extract_client_ip(headers, direct_ip),
        user_agent,
    }
}
