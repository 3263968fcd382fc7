//! Outbound HTTP client construction
//!
//! One client is built per process and shared; it owns the connection pool.

use std::time::Duration;

/// Default request timeout for third-party gateway calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = concat!("payment-service/", env!("CARGO_PKG_VERSION"));

/// Build the shared outbound client
///
/// `timeout` bounds the whole request; connecting is additionally capped
/// at five seconds.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .user_agent(USER_AGENT)
        .build()
}
