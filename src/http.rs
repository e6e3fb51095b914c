/// HTTP seam shared by the fetcher and the notifier.
///
/// Both only ever issue a bounded GET and look at the status and body, so
/// the transport is reduced to a single `do_get` call. The production
/// implementation is `reqwest::blocking::Client`; tests substitute a
/// recording fake.

use std::error::Error;
use std::time::Duration;

/// Transport-level error crossing the seam.
pub type TransportError = Box<dyn Error + Send + Sync>;

/// Status and raw body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking GET with a hard deadline.
pub trait HttpGet: Send + Sync {
    fn do_get(&self, url: &str, timeout: Duration) -> Result<RawResponse, TransportError>;
}

impl HttpGet for reqwest::blocking::Client {
    fn do_get(&self, url: &str, timeout: Duration) -> Result<RawResponse, TransportError> {
        let response = self.get(url).timeout(timeout).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(RawResponse { status, body })
    }
}

/// Builds the shared blocking client.
///
/// No client-wide timeout is set; every request carries its own deadline.
pub fn build_client() -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("pickup_watch/", env!("CARGO_PKG_VERSION")))
        .build()
}
