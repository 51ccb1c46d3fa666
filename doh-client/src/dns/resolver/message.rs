//! # DNS Message Model
//!
//! Building blocks shared by the query encoder and the response decoder:
//!
//! - [`HeaderSection`]: the 12-byte header, with its flags field modelled by [`DnsHeaderFlags`].
//! - [`QuestionSection`]: the name, type and class being asked for.
//! - [`RecordType`] / [`DnsClass`]: the TYPE and CLASS code tables.
//! - [`DnsQuery`]: a single-question query, encoded with [`DnsQuery::encode`] or
//!   the [`encode_query`] shortcut.
//!
//! Queries always ask for recursion (RD) and disable DNSSEC checking (CD).
//!
//! ```rust
//! use doh_client::dns::resolver::message::{encode_query, DnsClass, RecordType};
//!
//! let bytes = encode_query("example.com", RecordType::A, DnsClass::In).unwrap();
//! assert_eq!(&bytes[2..4], &[0x01, 0x10]);
//! ```

use crate::dns::compressor::MessageCompressor;
use crate::dns::errors::EncodeErrors;
use std::fmt::Display;
use std::sync::{LazyLock, Mutex};

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Size of the fixed DNS header.
pub const HEADER_LEN: usize = 12;

static ID_SOURCE: LazyLock<Mutex<SmallRng>> = LazyLock::new(|| {
    let mut thread_rng = rand::rng();
    Mutex::new(SmallRng::from_rng(&mut thread_rng))
});

/// Generates a random 16-bit ID for a DNS query.
///
/// IDs come from one generator seeded once per process. They are only used to tell
/// messages apart in logs; the DoH exchange already pairs each response with its request.
pub fn generate_id() -> u16 {
    let mut rng = ID_SOURCE.lock().unwrap_or_else(|e| e.into_inner());
    rng.random::<u16>()
}

/// Encodes a single-question query for `fqdn`, with a fresh random ID.
///
/// # Errors
/// Returns [`EncodeErrors`] if `fqdn` cannot be written as a label sequence.
pub fn encode_query(
    fqdn: &str,
    record_type: RecordType,
    class: DnsClass,
) -> Result<Vec<u8>, EncodeErrors> {
    DnsQuery::new(fqdn, record_type, class).encode()
}

/// A DNS query message: a header and exactly one question.
#[derive(Debug, Clone, PartialEq)]
pub struct DnsQuery {
    pub header: HeaderSection,
    // The question for the name server
    pub question: QuestionSection,
}

impl DnsQuery {
    /// Creates a new standard query message.
    ///
    /// # Arguments
    /// * `target` - The domain name to query.
    /// * `record_type` - Type of record (A, MX, TXT, etc.).
    /// * `class` - Class of the record, usually [`DnsClass::In`].
    pub fn new(target: &str, record_type: RecordType, class: DnsClass) -> DnsQuery {
        DnsQuery {
            header: HeaderSection {
                id: generate_id(), //random u16 number
                flags: DnsHeaderFlags {
                    qr: false,
                    opcode: OpCodeOptions::StandardQuery as u8,
                    aa: false,
                    tc: false,
                    rd: true,
                    ra: false,
                    z: false,
                    ad: false,
                    cd: true,
                    rcode: 0,
                }
                .to_u16(),
                qd_count: 1,
                an_count: 0,
                ns_count: 0,
                ar_count: 0,
            },
            question: QuestionSection {
                name: target.to_string(),
                record_type,
                class,
            },
        }
    }

    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Encodes the query into bytes, ready to be sent as a DoH request body.
    ///
    /// Layout: header, QNAME as uncompressed labels, QTYPE, QCLASS (all big-endian).
    pub fn encode(&self) -> Result<Vec<u8>, EncodeErrors> {
        let mut message: Vec<u8> = Vec::with_capacity(HEADER_LEN + self.question.name.len() + 6);

        message.extend_from_slice(&self.header.to_bytes());

        MessageCompressor::encode_name(&self.question.name, &mut message)?;
        message.extend_from_slice(&self.question.record_type.to_bytes());
        message.extend_from_slice(&self.question.class.to_bytes());
        Ok(message)
    }
}

/// Represents the header section of a DNS message (RFC 1035 §4.1.1).
///
/// Contains:
/// - A 16-bit identifier (`id`) to match requests and responses.
/// - Flags and control bits (`flags`), usually built with [`DnsHeaderFlags`].
/// - Counts for the number of entries in each section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderSection {
    /// Identifier to match requests and responses.
    pub id: u16,
    /// Flags and control bits for the DNS message.
    /// Use [`DnsHeaderFlags`]
    pub flags: u16,
    /// Number of entries in the question section.
    pub qd_count: u16,
    /// Number of resource records in the answer section.
    pub an_count: u16,
    /// Number of name server records in the authority section.
    pub ns_count: u16,
    /// Number of resource records in the additional section.
    pub ar_count: u16,
}

#[allow(clippy::wrong_self_convention)]
impl HeaderSection {
    /// Converts the header into a 12-byte array suitable for network transmission.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..2].copy_from_slice(&self.id.to_be_bytes());
        bytes[2..4].copy_from_slice(&self.flags.to_be_bytes());
        bytes[4..6].copy_from_slice(&self.qd_count.to_be_bytes());
        bytes[6..8].copy_from_slice(&self.an_count.to_be_bytes());
        bytes[8..10].copy_from_slice(&self.ns_count.to_be_bytes());
        bytes[10..12].copy_from_slice(&self.ar_count.to_be_bytes());
        bytes
    }

    /// Reads the header from the first 12 bytes of `message`.
    ///
    /// Returns `None` when `message` is shorter than a header.
    pub fn from_bytes(message: &[u8]) -> Option<Self> {
        let bytes: &[u8; HEADER_LEN] = message.get(..HEADER_LEN)?.try_into().ok()?;
        let word = |i: usize| u16::from_be_bytes([bytes[i], bytes[i + 1]]);

        Some(Self {
            id: word(0),
            flags: word(2),
            qd_count: word(4),
            an_count: word(6),
            ns_count: word(8),
            ar_count: word(10),
        })
    }
}

/// Represents the 16-bit DNS flags field (RFC 1035 §4.1.1, AD/CD from RFC 4035 §3.2).
///
/// Provides easy encode/decode between structured flags and the raw `u16`.
///
/// ```text
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DnsHeaderFlags {
    /// Query/Response flag
    pub qr: bool,
    /// Operation code
    /// Use `OpCodeOptions`
    pub opcode: u8,
    /// Authoritative Answer
    pub aa: bool,
    /// Truncation flag
    pub tc: bool,
    /// Recursion Desired
    pub rd: bool,
    /// Recursion Available
    pub ra: bool,
    /// Reserved bit
    pub z: bool,
    /// Authentic Data
    pub ad: bool,
    /// Checking Disabled
    pub cd: bool,
    /// Response code
    pub rcode: u8,
}

/// Operation codes available for DNS queries (RFC 1035 §4.1.1).
///
/// Only `StandardQuery` is sent or accepted by this crate.
// 3-15 reserved for future use
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCodeOptions {
    StandardQuery = 0,
    InverseQuery = 1,
    ServerStatusRequest = 2,
}

impl DnsHeaderFlags {
    /// Encode the flags into a 16-bit integer.
    pub fn to_u16(self) -> u16 {
        ((self.qr as u16) << 15)
            | ((self.opcode as u16 & 0b1111) << 11)
            | ((self.aa as u16) << 10)
            | ((self.tc as u16) << 9)
            | ((self.rd as u16) << 8)
            | ((self.ra as u16) << 7)
            | ((self.z as u16) << 6)
            | ((self.ad as u16) << 5)
            | ((self.cd as u16) << 4)
            | (self.rcode as u16 & 0b1111)
    }
    /// Decode from a 16-bit integer into structured flags.
    pub fn from_u16(value: u16) -> Self {
        Self {
            qr: (value >> 15) & 1 != 0,
            opcode: ((value >> 11) & 0b1111) as u8,
            aa: (value >> 10) & 1 != 0,
            tc: (value >> 9) & 1 != 0,
            rd: (value >> 8) & 1 != 0,
            ra: (value >> 7) & 1 != 0,
            z: (value >> 6) & 1 != 0,
            ad: (value >> 5) & 1 != 0,
            cd: (value >> 4) & 1 != 0,
            rcode: (value & 0b1111) as u8,
        }
    }
}

/// Represents the question section of a DNS message.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSection {
    /// The domain name being queried.
    pub name: String,
    /// The type of DNS record being requested (e.g., A, AAAA, MX).
    pub record_type: RecordType,
    /// The class of the DNS record (usually IN for Internet).
    pub class: DnsClass,
}

/// TYPE fields used in resource records and questions.
///
/// Codes this crate has no parser for are kept as `Unknown` so they survive decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordType {
    // A host address
    A,
    // An authoritative name server
    Ns,
    // The canonical name for an alias
    Cname,
    // Marks the start of a zone of authority
    Soa,
    // A domain name pointer
    Ptr,
    // Mail exchange
    Mx,
    // Text strings
    Txt,
    // An IPv6 host address (RFC 3596)
    Aaaa,
    // Service location (RFC 2782)
    Srv,
    Unknown(u16),
}

#[allow(clippy::wrong_self_convention)]
impl RecordType {
    pub fn to_u16(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Ns => 2,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Ptr => 12,
            RecordType::Mx => 15,
            RecordType::Txt => 16,
            RecordType::Aaaa => 28,
            RecordType::Srv => 33,
            RecordType::Unknown(code) => code,
        }
    }

    /// Encode the record type as a 2-byte big-endian value.
    pub fn to_bytes(self) -> [u8; 2] {
        self.to_u16().to_be_bytes()
    }
}

impl From<u16> for RecordType {
    fn from(value: u16) -> Self {
        match value {
            1 => RecordType::A,
            2 => RecordType::Ns,
            5 => RecordType::Cname,
            6 => RecordType::Soa,
            12 => RecordType::Ptr,
            15 => RecordType::Mx,
            16 => RecordType::Txt,
            28 => RecordType::Aaaa,
            33 => RecordType::Srv,
            code => RecordType::Unknown(code),
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::Ns => write!(f, "NS"),
            RecordType::Cname => write!(f, "CNAME"),
            RecordType::Soa => write!(f, "SOA"),
            RecordType::Ptr => write!(f, "PTR"),
            RecordType::Mx => write!(f, "MX"),
            RecordType::Txt => write!(f, "TXT"),
            RecordType::Aaaa => write!(f, "AAAA"),
            RecordType::Srv => write!(f, "SRV"),
            RecordType::Unknown(code) => write!(f, "TYPE{}", code),
        }
    }
}

/// CLASS fields used in resource records and questions (RFC 1035 §3.2.4, §3.2.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DnsClass {
    /// The Internet
    #[default]
    In,
    /// The CSNET class (obsolete)
    Cs,
    /// The CHAOS class
    Ch,
    /// Hesiod
    Hs,
    /// `*`, any class (QCLASS only)
    Any,
    Unknown(u16),
}

#[allow(clippy::wrong_self_convention)]
impl DnsClass {
    pub fn to_u16(self) -> u16 {
        match self {
            DnsClass::In => 1,
            DnsClass::Cs => 2,
            DnsClass::Ch => 3,
            DnsClass::Hs => 4,
            DnsClass::Any => 255,
            DnsClass::Unknown(code) => code,
        }
    }

    pub fn to_bytes(self) -> [u8; 2] {
        self.to_u16().to_be_bytes()
    }

    /// `true` for IN and for ANY, which includes IN.
    pub fn covers_internet(self) -> bool {
        matches!(self, DnsClass::In | DnsClass::Any)
    }
}

impl From<u16> for DnsClass {
    fn from(value: u16) -> Self {
        match value {
            1 => DnsClass::In,
            2 => DnsClass::Cs,
            3 => DnsClass::Ch,
            4 => DnsClass::Hs,
            255 => DnsClass::Any,
            code => DnsClass::Unknown(code),
        }
    }
}

impl Display for DnsClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DnsClass::In => write!(f, "IN"),
            DnsClass::Cs => write!(f, "CS"),
            DnsClass::Ch => write!(f, "CH"),
            DnsClass::Hs => write!(f, "HS"),
            DnsClass::Any => write!(f, "ANY"),
            DnsClass::Unknown(code) => write!(f, "CLASS{}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};

    #[test]
    fn test_record_type_to_bytes() {
        assert_eq!(RecordType::A.to_bytes(), [0x00, 0x01]); // A = 1 in big-endian
        assert_eq!(RecordType::Txt.to_bytes(), [0x00, 0x10]); // TXT = 16 in big-endian
        assert_eq!(RecordType::Srv.to_bytes(), [0x00, 0x21]);
        assert_eq!(RecordType::Unknown(257).to_bytes(), [0x01, 0x01]);
    }

    #[test]
    fn test_record_type_codes() {
        for code in [1u16, 2, 5, 6, 12, 15, 16, 28, 33, 41, 65535] {
            assert_eq!(RecordType::from(code).to_u16(), code);
        }
        assert_eq!(RecordType::from(28), RecordType::Aaaa);
        assert_eq!(RecordType::from(41), RecordType::Unknown(41));
        assert_eq!(RecordType::Unknown(41).to_string(), "TYPE41");
    }

    #[test]
    fn test_dns_class_codes() {
        for code in [1u16, 2, 3, 4, 255, 254] {
            assert_eq!(DnsClass::from(code).to_u16(), code);
        }
        assert_eq!(DnsClass::from(255), DnsClass::Any);
        assert!(DnsClass::In.covers_internet());
        assert!(DnsClass::Any.covers_internet());
        assert!(!DnsClass::Ch.covers_internet());
        assert_eq!(DnsClass::default(), DnsClass::In);
    }

    #[test]
    fn test_dns_header_flags_encode_decode() {
        let flags = DnsHeaderFlags {
            qr: true,
            opcode: OpCodeOptions::ServerStatusRequest as u8,
            aa: true,
            tc: false,
            rd: true,
            ra: false,
            z: true,
            ad: false,
            cd: true,
            rcode: 5,
        };

        let decoded = DnsHeaderFlags::from_u16(flags.to_u16());

        assert_eq!(decoded, flags);
    }

    #[test]
    fn test_dns_header_flags_query_bits() {
        let query = DnsQuery::new("example.com", RecordType::A, DnsClass::In);

        // RD in the first flags byte, CD in the second
        assert_eq!(query.header.flags.to_be_bytes(), [0x01, 0x10]);
    }

    #[test]
    fn test_header_section_from_bytes() {
        let header = HeaderSection {
            id: 0xBC23,
            flags: 0x8190,
            qd_count: 1,
            an_count: 4,
            ns_count: 0,
            ar_count: 1,
        };

        assert_eq!(HeaderSection::from_bytes(&header.to_bytes()), Some(header));
        assert_eq!(HeaderSection::from_bytes(&[0u8; 11]), None);
    }

    #[test]
    fn test_dns_query_new() {
        let query = DnsQuery::new("example.com", RecordType::A, DnsClass::In);

        assert_eq!(query.header.qd_count, 1);
        assert_eq!(query.header.an_count, 0);
        assert_eq!(query.header.ns_count, 0);
        assert_eq!(query.header.ar_count, 0);

        assert_eq!(query.question.name, "example.com");
        assert_eq!(query.question.record_type, RecordType::A);
        assert_eq!(query.question.class, DnsClass::In);
    }

    #[test]
    fn test_dns_query_encode_exact_bytes() {
        let bytes = encode_query("brendan.abolivier.bzh", RecordType::A, DnsClass::In).unwrap();

        // Don't check the randomly generated ID.
        assert_eq!(
            STANDARD_NO_PAD.encode(&bytes[2..]),
            "ARAAAQAAAAAAAAdicmVuZGFuCWFib2xpdmllcgNiemgAAAEAAQ"
        );
    }

    #[test]
    fn test_dns_query_encode_header_matches_struct() {
        let query = DnsQuery::new("example.com", RecordType::Mx, DnsClass::Ch);
        let bytes = query.encode().unwrap();

        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), query.id());
        assert_eq!(&bytes[..HEADER_LEN], &query.header.to_bytes());

        let tail = &bytes[bytes.len() - 4..];
        assert_eq!(tail, &[0x00, 0x0F, 0x00, 0x03]);
    }

    #[test]
    fn test_dns_query_encode_is_deterministic_apart_from_id() {
        for rec in [
            RecordType::A,
            RecordType::Aaaa,
            RecordType::Mx,
            RecordType::Txt,
            RecordType::Cname,
            RecordType::Ns,
            RecordType::Srv,
        ] {
            let first = encode_query("example.com", rec, DnsClass::In).unwrap();
            let second = encode_query("example.com", rec, DnsClass::In).unwrap();

            assert_eq!(first.len(), second.len());
            assert_eq!(first[2..], second[2..]);

            let encoded_type = u16::from_be_bytes([first[first.len() - 4], first[first.len() - 3]]);
            assert_eq!(encoded_type, rec.to_u16());
        }
    }

    #[test]
    fn test_dns_query_encode_rejects_bad_name() {
        let name = format!("{}.com", "a".repeat(64));

        let result = encode_query(&name, RecordType::A, DnsClass::In);
        assert!(matches!(result, Err(EncodeErrors::LabelTooLong(_))));
    }
}
