//! # DNS Transporter
//!
//! Moves encoded queries to a DNS-over-HTTPS server and brings the raw response back.
//!
//! - [`DnsTransport`]: the seam the lookup façade talks to. Anything that can exchange
//!   one message for another implements it, which keeps the façade testable without a
//!   network.
//! - [`HttpsTransport`]: the RFC 8484 implementation. Each exchange is one HTTP POST
//!   whose body is the wire-format query.
//! - A process-wide list of DoH endpoints, with a default set of public resolvers that
//!   callers may replace at runtime.
//!
//! ## Default servers
//!
//! - `https://cloudflare-dns.com/dns-query`
//! - `https://dns.google/dns-query`
//! - `https://dns.quad9.net/dns-query`
//!
//! ## Example
//!
//! ```rust,no_run
//! use doh_client::dns::resolver::transporter::{get_servers, set_servers, reset_servers, has_custom_servers};
//!
//! assert!(!has_custom_servers());
//!
//! set_servers(vec!["https://doh.example.net/dns-query"]).expect("failed to set servers");
//! assert_eq!(get_servers()[0], "https://doh.example.net/dns-query");
//!
//! reset_servers();
//! assert!(!has_custom_servers());
//! ```
//!
//! Reads of the server list hand out an `Arc` clone, so many concurrent lookups share
//! one allocation. Writes take the lock only long enough to swap the list.
//!
//! The wire format of one exchange:
//!
//! ```text
//! POST /dns-query HTTP/2
//! Content-Type: application/dns-message
//! Accept: application/dns-message
//!
//! <raw DNS message bytes>
//! ```

use crate::dns::errors::TransportErrors;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::debug;

/// Media type of a DNS message carried over HTTP (RFC 8484 §6).
pub const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

/// Public DoH resolvers used when no custom list is set.
static DEFAULT_SERVERS: &[&str] = &[
    "https://cloudflare-dns.com/dns-query",
    "https://dns.google/dns-query",
    "https://dns.quad9.net/dns-query",
];

/// Custom DoH endpoint list. `None` means the defaults are active.
static CUSTOM_SERVERS: RwLock<Option<Arc<Vec<String>>>> = RwLock::new(None);

/// Shared HTTP client with connection pooling, used unless a transport gets its own.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Returns the currently active list of DoH endpoints.
///
/// If a custom list has been set with [`set_servers`], that list is returned.
pub fn get_servers() -> Arc<Vec<String>> {
    if let Some(list) = &*CUSTOM_SERVERS.read() {
        Arc::clone(list)
    } else {
        Arc::new(DEFAULT_SERVERS.iter().map(|s| s.to_string()).collect())
    }
}

/// Replaces the active endpoint list with `list`.
///
/// Every entry must be an absolute `https://` URL with a host.
///
/// # Errors
/// - [`TransportErrors::NoServers`] if `list` is empty.
/// - [`TransportErrors::InvalidServer`] for the first entry that is not a usable URL.
///
/// The active list is left untouched on error.
pub fn set_servers(list: Vec<&str>) -> Result<(), TransportErrors> {
    if list.is_empty() {
        return Err(TransportErrors::NoServers);
    }
    for server in &list {
        validate_server(server)?;
    }
    *CUSTOM_SERVERS.write() = Some(Arc::new(list.iter().map(|s| s.to_string()).collect()));
    Ok(())
}

/// Resets the endpoint list to the built-in defaults.
pub fn reset_servers() {
    *CUSTOM_SERVERS.write() = None;
}

/// Returns `true` if a custom list of endpoints is currently active.
pub fn has_custom_servers() -> bool {
    CUSTOM_SERVERS.read().is_some()
}

fn validate_server(server: &str) -> Result<(), TransportErrors> {
    match reqwest::Url::parse(server) {
        Ok(url) if url.scheme() == "https" && url.host_str().is_some() => Ok(()),
        _ => Err(TransportErrors::InvalidServer(server.to_string())),
    }
}

/// Exchanges one encoded DNS query for one encoded DNS response.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Sends `query` and returns the raw response bytes, giving up after `timeout`.
    async fn exchange(&self, query: &[u8], timeout: Duration) -> Result<Vec<u8>, TransportErrors>;

    fn protocol_name(&self) -> &'static str;
}

/// DNS-over-HTTPS transport (RFC 8484), POST method.
#[derive(Debug, Clone)]
pub struct HttpsTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpsTransport {
    /// Creates a transport for `url` using the shared HTTP client.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, SHARED_CLIENT.clone())
    }

    /// Creates a transport for `url` that sends through `client`.
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Creates a transport for the first endpoint of the active server list.
    pub fn from_servers() -> Result<Self, TransportErrors> {
        let servers = get_servers();
        let url = servers.first().ok_or(TransportErrors::NoServers)?;
        Ok(Self::new(url.as_str()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn exchange(&self, query: &[u8], timeout: Duration) -> Result<Vec<u8>, TransportErrors> {
        debug!(url = %self.url, message_len = query.len(), "Sending DoH query");

        let response = tokio::time::timeout(
            timeout,
            self.client
                .post(&self.url)
                .header(reqwest::header::CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
                .header(reqwest::header::ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
                .body(query.to_vec())
                .send(),
        )
        .await
        .map_err(|_| TransportErrors::Timeout(timeout))?
        .map_err(|source| TransportErrors::Request {
            url: self.url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportErrors::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = tokio::time::timeout(timeout, response.bytes())
            .await
            .map_err(|_| TransportErrors::Timeout(timeout))?
            .map_err(|source| TransportErrors::Body {
                url: self.url.clone(),
                source,
            })?;

        debug!(url = %self.url, response_len = body.len(), "DoH response received");

        Ok(body.to_vec())
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}
