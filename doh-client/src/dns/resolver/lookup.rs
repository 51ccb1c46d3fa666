//! # Lookup Façade
//!
//! One async call per supported record type. Each call encodes a query, hands it to a
//! [`DnsTransport`], decodes the response and keeps only the answers of the requested
//! type, paired with their TTL, in the order the server sent them.
//!
//! ```rust,no_run
//! use doh_client::dns::resolver::lookup::{Resolver, ResolverOptions};
//! use doh_client::dns::resolver::transporter::HttpsTransport;
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = Resolver::new(HttpsTransport::new("https://dns.google/dns-query"))
//!         .with_options(ResolverOptions {
//!             timeout_ms: 2_000,
//!             ..Default::default()
//!         });
//!
//!     match resolver.lookup_a("example.com", None).await {
//!         Ok(records) => {
//!             for r in records {
//!                 println!("{} (ttl {})", r.record.ip4, r.ttl);
//!             }
//!         }
//!         Err(e) => eprintln!("lookup failed: {e}"),
//!     }
//! }
//! ```
//!
//! Every lookup takes an optional [`CancellationToken`]. Cancelling it aborts the
//! exchange and the lookup returns [`ResolverErrors::Cancelled`].

use crate::dns::errors::{ResolverErrors, TransportErrors};
use crate::dns::resolver::message::{DnsClass, DnsQuery, HeaderSection, RecordType};
use crate::dns::resolver::records::{
    AaaaRecord, ARecord, CnameRecord, MxRecord, NsRecord, PtrRecord, RecordData, SoaRecord,
    SrvRecord, TxtRecord,
};
use crate::dns::resolver::response::{Answer, decode_response};
use crate::dns::resolver::transporter::{DnsTransport, HttpsTransport};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A decoded record with the TTL it was served with.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WithTtl<R> {
    pub record: R,
    /// Time-to-live in seconds.
    pub ttl: u32,
}

/// Configuration of a [`Resolver`].
///
/// ```text
/// ResolverOptions {
///     class: DnsClass::In,
///     timeout_ms: 5_000,
/// }
/// ```
#[derive(Clone, Debug)]
pub struct ResolverOptions {
    /// Class asked for by every lookup but A and AAAA, which always ask for IN.
    pub class: DnsClass,
    /// Timeout for one exchange with the server, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            class: DnsClass::In,
            timeout_ms: 5_000,
        }
    }
}

/// Runs typed lookups over a [`DnsTransport`].
///
/// A `Resolver` holds no per-lookup state, so one instance can serve any number of
/// concurrent lookups.
#[derive(Debug, Clone)]
pub struct Resolver<T: DnsTransport = HttpsTransport> {
    transport: T,
    options: ResolverOptions,
}

impl Resolver<HttpsTransport> {
    /// Creates a resolver for the first endpoint of the active DoH server list.
    pub fn from_servers() -> Result<Self, TransportErrors> {
        Ok(Self::new(HttpsTransport::from_servers()?))
    }
}

impl<T: DnsTransport> Resolver<T> {
    /// Creates a resolver with default options over `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            options: ResolverOptions::default(),
        }
    }

    /// Sets custom configuration of the [`Resolver`].
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Looks up IPv4 addresses. The configured class must be IN or ANY.
    pub async fn lookup_a(
        &self,
        fqdn: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<WithTtl<ARecord>>, ResolverErrors> {
        self.require_internet()?;
        let answers = self.lookup(fqdn, RecordType::A, DnsClass::In, cancel).await?;
        Ok(pick(answers, |data| match data {
            RecordData::A(r) => Some(r),
            _ => None,
        }))
    }

    /// Looks up IPv6 addresses. The configured class must be IN or ANY.
    pub async fn lookup_aaaa(
        &self,
        fqdn: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<WithTtl<AaaaRecord>>, ResolverErrors> {
        self.require_internet()?;
        let answers = self
            .lookup(fqdn, RecordType::Aaaa, DnsClass::In, cancel)
            .await?;
        Ok(pick(answers, |data| match data {
            RecordData::Aaaa(r) => Some(r),
            _ => None,
        }))
    }

    pub async fn lookup_cname(
        &self,
        fqdn: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<WithTtl<CnameRecord>>, ResolverErrors> {
        let answers = self.lookup_configured(fqdn, RecordType::Cname, cancel).await?;
        Ok(pick(answers, |data| match data {
            RecordData::Cname(r) => Some(r),
            _ => None,
        }))
    }

    pub async fn lookup_mx(
        &self,
        fqdn: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<WithTtl<MxRecord>>, ResolverErrors> {
        let answers = self.lookup_configured(fqdn, RecordType::Mx, cancel).await?;
        Ok(pick(answers, |data| match data {
            RecordData::Mx(r) => Some(r),
            _ => None,
        }))
    }

    pub async fn lookup_ns(
        &self,
        fqdn: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<WithTtl<NsRecord>>, ResolverErrors> {
        let answers = self.lookup_configured(fqdn, RecordType::Ns, cancel).await?;
        Ok(pick(answers, |data| match data {
            RecordData::Ns(r) => Some(r),
            _ => None,
        }))
    }

    pub async fn lookup_txt(
        &self,
        fqdn: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<WithTtl<TxtRecord>>, ResolverErrors> {
        let answers = self.lookup_configured(fqdn, RecordType::Txt, cancel).await?;
        Ok(pick(answers, |data| match data {
            RecordData::Txt(r) => Some(r),
            _ => None,
        }))
    }

    pub async fn lookup_soa(
        &self,
        fqdn: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<WithTtl<SoaRecord>>, ResolverErrors> {
        let answers = self.lookup_configured(fqdn, RecordType::Soa, cancel).await?;
        Ok(pick(answers, |data| match data {
            RecordData::Soa(r) => Some(r),
            _ => None,
        }))
    }

    pub async fn lookup_ptr(
        &self,
        fqdn: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<WithTtl<PtrRecord>>, ResolverErrors> {
        let answers = self.lookup_configured(fqdn, RecordType::Ptr, cancel).await?;
        Ok(pick(answers, |data| match data {
            RecordData::Ptr(r) => Some(r),
            _ => None,
        }))
    }

    pub async fn lookup_srv(
        &self,
        fqdn: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<WithTtl<SrvRecord>>, ResolverErrors> {
        let answers = self.lookup_configured(fqdn, RecordType::Srv, cancel).await?;
        Ok(pick(answers, |data| match data {
            RecordData::Srv(r) => Some(r),
            _ => None,
        }))
    }

    /// SRV lookup on `_service._protocol.domain`, e.g. `("xmpp-server", "tcp", "example.com")`.
    pub async fn lookup_service(
        &self,
        service: &str,
        protocol: &str,
        domain: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<WithTtl<SrvRecord>>, ResolverErrors> {
        self.lookup_srv(&service_name(service, protocol, domain), cancel)
            .await
    }

    fn require_internet(&self) -> Result<(), ResolverErrors> {
        if self.options.class.covers_internet() {
            Ok(())
        } else {
            Err(ResolverErrors::ClassMismatch(self.options.class))
        }
    }

    async fn lookup_configured(
        &self,
        fqdn: &str,
        record_type: RecordType,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Answer>, ResolverErrors> {
        self.lookup(fqdn, record_type, self.options.class, cancel)
            .await
    }

    async fn lookup(
        &self,
        fqdn: &str,
        record_type: RecordType,
        class: DnsClass,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Answer>, ResolverErrors> {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(ResolverErrors::Cancelled);
        }

        let query = DnsQuery::new(fqdn, record_type, class);
        let bytes = query.encode()?;

        debug!(
            fqdn,
            record_type = %record_type,
            class = %class,
            id = query.id(),
            protocol = self.transport.protocol_name(),
            "Starting lookup"
        );

        let response = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(ResolverErrors::Cancelled),
                response = self.exchange(&bytes) => response?,
            },
            None => self.exchange(&bytes).await?,
        };

        if let Some(header) = HeaderSection::from_bytes(&response) {
            if header.id != query.id() {
                debug!(
                    query_id = query.id(),
                    response_id = header.id,
                    "Response ID differs from the query ID"
                );
            }
        }

        Ok(decode_response(&response)?)
    }

    async fn exchange(&self, query: &[u8]) -> Result<Vec<u8>, TransportErrors> {
        let timeout = Duration::from_millis(self.options.timeout_ms);
        tokio::time::timeout(timeout, self.transport.exchange(query, timeout))
            .await
            .map_err(|_| TransportErrors::Timeout(timeout))?
    }
}

/// Builds the owner name of an SRV service: `_service._protocol.domain`.
pub fn service_name(service: &str, protocol: &str, domain: &str) -> String {
    format!("_{service}._{protocol}.{domain}")
}

/// Keeps the answers whose payload `f` accepts, in order, with their TTL.
fn pick<R>(answers: Vec<Answer>, f: impl Fn(RecordData) -> Option<R>) -> Vec<WithTtl<R>> {
    answers
        .into_iter()
        .filter_map(|answer| {
            let ttl = answer.ttl;
            answer.data.and_then(&f).map(|record| WithTtl { record, ttl })
        })
        .collect()
}
