//! Shared HTTP client
//!
//! One lazily built client for every naming request, so concurrent calls
//! share TLS sessions and pooled connections instead of each paying for its
//! own handshake.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Global HTTP client for OpenAI API calls
///
/// - 90s timeout per request
/// - 32 idle connections per host for concurrent naming calls
/// - 90s idle timeout
pub static OPENAI_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
        .expect("Failed to create OpenAI HTTP client")
});

/// Get the global OpenAI HTTP client
#[inline]
pub fn openai_client() -> &'static Client {
    &OPENAI_CLIENT
}
