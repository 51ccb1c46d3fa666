//! # DNS-over-HTTPS Resolver
//!
//! Queries and responses follow [RFC 1035](https://datatracker.ietf.org/doc/html/rfc1035)
//! and travel as HTTPS POST bodies per [RFC 8484](https://datatracker.ietf.org/doc/html/rfc8484).
//!
//! ## Available Features
//!
//! | Feature     | Description                                                              |
//! |-------------|--------------------------------------------------------------------------|
//! | `tokio-dep` | Enables the HTTPS transport and the async lookup façade (default).       |
//! | `serde`     | Derives `Serialize`/`Deserialize` on answers, records and code tables.    |
//!
//! With default features disabled only the codec is built: [`message`], [`records`] and
//! [`response`], with no network I/O and no runtime.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doh_client::dns::resolver::Resolver;
//! use tokio::join;
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = Resolver::from_servers().expect("no DoH server configured");
//!
//!     let (a_records, txt_records) = join!(
//!         resolver.lookup_a("example.com", None),
//!         resolver.lookup_txt("example.com", None)
//!     );
//!
//!     match a_records {
//!         Ok(ips) => println!("{:#?}", ips),
//!         Err(e) => eprintln!("IPv4 lookup failed: {e}"),
//!     }
//!
//!     match txt_records {
//!         Ok(txts) => println!("{:#?}", txts),
//!         Err(e) => eprintln!("TXT lookup failed: {e}"),
//!     }
//! }
//! ```
//!
//! ## Codec only
//!
//! ```rust
//! use doh_client::dns::resolver::message::{encode_query, DnsClass, RecordType};
//! use doh_client::dns::resolver::response::decode_response;
//!
//! let query = encode_query("example.com", RecordType::Mx, DnsClass::In).unwrap();
//! // `query` goes to any DoH server; its response goes to `decode_response`.
//! assert!(decode_response(&query).is_err()); // a query is not a response
//! ```
//!
//! ## Supported Record Types
//!
//! - `A`: IPv4 address
//! - `AAAA`: IPv6 address
//! - `CNAME`: canonical name (alias)
//! - `MX`: mail exchange
//! - `NS`: authoritative name server
//! - `PTR`: domain name pointer
//! - `SOA`: start of authority
//! - `SRV`: service location
//! - `TXT`: text strings
//!
//! Answers of any other type are kept with no parsed payload, see
//! [`response::UnknownRecordPolicy`].

pub mod message;
pub mod records;
pub mod response;

pub use message::{DnsClass, RecordType, encode_query};
pub use records::RecordData;
pub use response::{Answer, UnknownRecordPolicy, decode_response, decode_response_with};

cfg_if::cfg_if! {
    if #[cfg(feature = "tokio-dep")] {
        pub mod lookup;
        pub mod transporter;

        pub use lookup::{Resolver, ResolverOptions, WithTtl};
        pub use transporter::{DnsTransport, HttpsTransport};
    }
}
