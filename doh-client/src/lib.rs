#![cfg_attr(docsrs, feature(doc_cfg))]
//! # doh-client
//!
//! A DNS-over-HTTPS client library written in pure Rust.
//!
//! It builds RFC 1035 queries, decodes the responses (compressed names included) into
//! typed records, and sends queries to DoH servers as RFC 8484 POST requests.
//!
//! ## Features
//!
//! - **Codec (always built)**
//!   - Query encoding for a single question, with recursion desired and DNSSEC checking disabled.
//!   - Response decoding with header validation, RCODE mapping and pointer-loop-safe
//!     name decompression.
//!   - Record parsers for A, AAAA, CNAME, MX, NS, PTR, SOA, SRV and TXT.
//!
//! - **Tokio (`tokio-dep`, default)**
//!   - HTTPS transport on `reqwest` with a shared connection pool.
//!   - Process-wide list of DoH endpoints, replaceable at runtime.
//!   - Async lookups per record type with timeout and cancellation.
//!
//! - **Serde (`serde`)**
//!   - `Serialize`/`Deserialize` for answers, records and code tables.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! doh-client = "0.1"
//! doh-client = { version = "0.1", default-features = false } # codec only
//! ```
//!
//! ```rust,no_run
//! use doh_client::dns::resolver::{Resolver, HttpsTransport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = Resolver::new(HttpsTransport::new("https://cloudflare-dns.com/dns-query"));
//!
//!     let mx = resolver.lookup_mx("example.com", None).await.unwrap();
//!     for r in mx {
//!         println!("{} {} (ttl {})", r.record.preference, r.record.exchange, r.ttl);
//!     }
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, E>`. The error enums live in [`dns::errors`] and
//! convert into `ResolverErrors` with `?`:
//!
//! ```rust
//! use doh_client::dns::errors::{DecodeQueryErrors, ServerErrors};
//! use doh_client::dns::resolver::decode_response;
//!
//! // header of a NXDOMAIN response with no question and no answer
//! let nxdomain = [0x12, 0x34, 0x81, 0x83, 0, 0, 0, 0, 0, 0, 0, 0];
//! assert_eq!(
//!     decode_response(&nxdomain),
//!     Err(DecodeQueryErrors::Server(ServerErrors::NameError))
//! );
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.
//!
//! ## License
//!
//! This project is licensed under the MIT License.

pub mod dns;
