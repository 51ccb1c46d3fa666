//! # Resource Record Parsers
//!
//! One parser per supported record type. Each one takes the RDATA of a single record
//! and the whole response message; names inside RDATA may be compressed and their
//! pointers are offsets from the start of the message (RFC 1035 §4.1.4).
//!
//! Numeric fields are big-endian. RDATA shorter than a type's fixed-width fields is
//! reported as [`DecodeQueryErrors::Corrupted`]; trailing bytes past what a parser
//! reads are ignored.
//!
//! TXT records only keep their first character-string.

use crate::dns::compressor::MessageCompressor;
use crate::dns::errors::DecodeQueryErrors;
use crate::dns::resolver::message::{DnsClass, RecordType};

/// IPv4 host address, dotted decimal (`"51.38.47.191"`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ARecord {
    pub ip4: String,
}

/// IPv6 host address as eight hex groups, without `::` compression
/// (`"2001:41d0:302:1100:0:0:a:d8f1"`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AaaaRecord {
    pub ip6: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CnameRecord {
    pub cname: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NsRecord {
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PtrRecord {
    pub ptr: String,
}

/// Mail exchange: lower `preference` values are tried first.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

/// Service location (RFC 2782).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SrvRecord {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// First character-string of a TXT record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxtRecord {
    pub txt: String,
}

/// Start of a zone of authority. Refresh, retry and expire are signed per RFC 1035 §3.3.13.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoaRecord {
    pub primary_ns: String,
    pub resp_mailbox: String,
    pub serial: u32,
    pub refresh: i32,
    pub retry: i32,
    pub expire: i32,
    pub minimum: u32,
}

/// Parsed body of a resource record, tagged by record type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordData {
    A(ARecord),
    Aaaa(AaaaRecord),
    Cname(CnameRecord),
    Ns(NsRecord),
    Ptr(PtrRecord),
    Mx(MxRecord),
    Srv(SrvRecord),
    Txt(TxtRecord),
    Soa(SoaRecord),
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::Aaaa,
            RecordData::Cname(_) => RecordType::Cname,
            RecordData::Ns(_) => RecordType::Ns,
            RecordData::Ptr(_) => RecordType::Ptr,
            RecordData::Mx(_) => RecordType::Mx,
            RecordData::Srv(_) => RecordType::Srv,
            RecordData::Txt(_) => RecordType::Txt,
            RecordData::Soa(_) => RecordType::Soa,
        }
    }
}

/// Parses RDATA of the given type and class.
///
/// CNAME, MX, SRV, NS, TXT, SOA and PTR are parsed in any class. A and AAAA are only
/// parsed in IN or ANY. `Ok(None)` means there is no parser for the combination.
pub fn parse_rdata(
    record_type: RecordType,
    class: DnsClass,
    rdata: &[u8],
    message: &[u8],
) -> Result<Option<RecordData>, DecodeQueryErrors> {
    let data = match record_type {
        RecordType::Cname => RecordData::Cname(parse_cname(rdata, message)?),
        RecordType::Mx => RecordData::Mx(parse_mx(rdata, message)?),
        RecordType::Srv => RecordData::Srv(parse_srv(rdata, message)?),
        RecordType::Ns => RecordData::Ns(parse_ns(rdata, message)?),
        RecordType::Txt => RecordData::Txt(parse_txt(rdata)?),
        RecordType::Soa => RecordData::Soa(parse_soa(rdata, message)?),
        RecordType::Ptr => RecordData::Ptr(parse_ptr(rdata, message)?),
        RecordType::A if class.covers_internet() => RecordData::A(parse_a(rdata)?),
        RecordType::Aaaa if class.covers_internet() => RecordData::Aaaa(parse_aaaa(rdata)?),
        _ => return Ok(None),
    };
    Ok(Some(data))
}

fn fixed<const N: usize>(rdata: &[u8], at: usize) -> Result<[u8; N], DecodeQueryErrors> {
    rdata
        .get(at..at + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(DecodeQueryErrors::Corrupted)
}

fn read_u16(rdata: &[u8], at: usize) -> Result<u16, DecodeQueryErrors> {
    fixed::<2>(rdata, at).map(u16::from_be_bytes)
}

fn read_u32(rdata: &[u8], at: usize) -> Result<u32, DecodeQueryErrors> {
    fixed::<4>(rdata, at).map(u32::from_be_bytes)
}

pub fn parse_a(rdata: &[u8]) -> Result<ARecord, DecodeQueryErrors> {
    let octets = fixed::<4>(rdata, 0)?;
    let ip4 = octets
        .iter()
        .map(|octet| octet.to_string())
        .collect::<Vec<_>>()
        .join(".");

    Ok(ARecord { ip4 })
}

pub fn parse_aaaa(rdata: &[u8]) -> Result<AaaaRecord, DecodeQueryErrors> {
    let octets = fixed::<16>(rdata, 0)?;
    // TODO: offer RFC 5952 output (a:0:0:0:b -> a::b) behind an option
    let ip6 = octets
        .chunks_exact(2)
        .map(|group| format!("{:x}", u16::from_be_bytes([group[0], group[1]])))
        .collect::<Vec<_>>()
        .join(":");

    Ok(AaaaRecord { ip6 })
}

pub fn parse_cname(rdata: &[u8], message: &[u8]) -> Result<CnameRecord, DecodeQueryErrors> {
    let (cname, _) = MessageCompressor::decompress(rdata, 0, message)?;
    Ok(CnameRecord { cname })
}

pub fn parse_ns(rdata: &[u8], message: &[u8]) -> Result<NsRecord, DecodeQueryErrors> {
    let (host, _) = MessageCompressor::decompress(rdata, 0, message)?;
    Ok(NsRecord { host })
}

pub fn parse_ptr(rdata: &[u8], message: &[u8]) -> Result<PtrRecord, DecodeQueryErrors> {
    let (ptr, _) = MessageCompressor::decompress(rdata, 0, message)?;
    Ok(PtrRecord { ptr })
}

pub fn parse_mx(rdata: &[u8], message: &[u8]) -> Result<MxRecord, DecodeQueryErrors> {
    let preference = read_u16(rdata, 0)?;
    let (exchange, _) = MessageCompressor::decompress(rdata, 2, message)?;

    Ok(MxRecord {
        preference,
        exchange,
    })
}

pub fn parse_srv(rdata: &[u8], message: &[u8]) -> Result<SrvRecord, DecodeQueryErrors> {
    let priority = read_u16(rdata, 0)?;
    let weight = read_u16(rdata, 2)?;
    let port = read_u16(rdata, 4)?;
    let (target, _) = MessageCompressor::decompress(rdata, 6, message)?;

    Ok(SrvRecord {
        priority,
        weight,
        port,
        target,
    })
}

pub fn parse_txt(rdata: &[u8]) -> Result<TxtRecord, DecodeQueryErrors> {
    let length = *rdata.first().ok_or(DecodeQueryErrors::Corrupted)? as usize;
    let text = rdata
        .get(1..1 + length)
        .ok_or(DecodeQueryErrors::Corrupted)?;

    Ok(TxtRecord {
        txt: String::from_utf8_lossy(text).into_owned(),
    })
}

pub fn parse_soa(rdata: &[u8], message: &[u8]) -> Result<SoaRecord, DecodeQueryErrors> {
    let (primary_ns, mut offset) = MessageCompressor::decompress(rdata, 0, message)?;
    let (resp_mailbox, consumed) = MessageCompressor::decompress(rdata, offset, message)?;
    offset += consumed;

    Ok(SoaRecord {
        primary_ns,
        resp_mailbox,
        serial: read_u32(rdata, offset)?,
        refresh: read_u32(rdata, offset + 4)? as i32,
        retry: read_u32(rdata, offset + 8)? as i32,
        expire: read_u32(rdata, offset + 12)? as i32,
        minimum: read_u32(rdata, offset + 16)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};

    fn rdata(b64: &str) -> Vec<u8> {
        STANDARD_NO_PAD.decode(b64).unwrap()
    }

    #[test]
    fn test_records_parse_a() {
        let bytes = rdata("MyYvvw");
        assert_eq!(parse_a(&bytes).unwrap().ip4, "51.38.47.191");
    }

    #[test]
    fn test_records_parse_aaaa() {
        let bytes = rdata("IAFB0AMCEQAAAAAAAArY8Q");
        assert_eq!(
            parse_aaaa(&bytes).unwrap().ip6,
            "2001:41d0:302:1100:0:0:a:d8f1"
        );
    }

    #[test]
    fn test_records_parse_cname() {
        let bytes = rdata("BWVycm9sEGJyZW5kYW5hYm9saXZpZXIDY29tAA");
        assert_eq!(
            parse_cname(&bytes, &bytes).unwrap().cname,
            "errol.brendanabolivier.com"
        );
    }

    #[test]
    fn test_records_parse_mx() {
        let bytes = rdata("AAEDbXgzA292aANuZXQA");
        let rec = parse_mx(&bytes, &bytes).unwrap();

        assert_eq!(rec.preference, 1);
        assert_eq!(rec.exchange, "mx3.ovh.net");
    }

    #[test]
    fn test_records_parse_srv() {
        let bytes = rdata("AAoAACEABGNoYXQJYWJvbGl2aWVyA2J6aAA");
        let rec = parse_srv(&bytes, &bytes).unwrap();

        assert_eq!(
            rec,
            SrvRecord {
                priority: 10,
                weight: 0,
                port: 8448,
                target: "chat.abolivier.bzh".to_string(),
            }
        );
    }

    #[test]
    fn test_records_parse_ns() {
        let bytes = rdata("BW5zMjAwB2FueWNhc3QCbWUA");
        assert_eq!(parse_ns(&bytes, &bytes).unwrap().host, "ns200.anycast.me");
    }

    #[test]
    fn test_records_parse_txt() {
        let bytes = rdata("HzR8aHR0cHM6Ly9icmVuZGFuLmFib2xpdmllci5iemg");
        assert_eq!(
            parse_txt(&bytes).unwrap().txt,
            "4|https://brendan.abolivier.bzh"
        );
    }

    #[test]
    fn test_records_parse_txt_keeps_first_string_only() {
        let bytes = [3, b'o', b'n', b'e', 3, b't', b'w', b'o'];
        assert_eq!(parse_txt(&bytes).unwrap().txt, "one");
    }

    #[test]
    fn test_records_parse_soa() {
        let bytes = rdata(
            "BmRuczIwMAdhbnljYXN0Am1lAAR0ZWNoA292aANuZXQAeFfPoAABUYAAAA4QADbugAAAASw",
        );
        let rec = parse_soa(&bytes, &bytes).unwrap();

        assert_eq!(
            rec,
            SoaRecord {
                primary_ns: "dns200.anycast.me".to_string(),
                resp_mailbox: "tech.ovh.net".to_string(),
                serial: 2019020704,
                refresh: 86400,
                retry: 3600,
                expire: 3600000,
                minimum: 300,
            }
        );
    }

    #[test]
    fn test_records_parse_soa_signed_fields() {
        let mut bytes = vec![0, 0];
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&[0xFF; 12]);
        bytes.extend_from_slice(&u32::MAX.to_be_bytes());

        let rec = parse_soa(&bytes, &bytes).unwrap();

        assert_eq!(rec.primary_ns, "");
        assert_eq!(rec.resp_mailbox, "");
        assert_eq!(rec.refresh, -1);
        assert_eq!(rec.retry, -1);
        assert_eq!(rec.expire, -1);
        assert_eq!(rec.minimum, u32::MAX);
    }

    #[test]
    fn test_records_parse_ptr() {
        let bytes = rdata("BmFyYWdvZxBicmVuZGFuYWJvbGl2aWVyA2NvbQA");
        assert_eq!(
            parse_ptr(&bytes, &bytes).unwrap().ptr,
            "aragog.brendanabolivier.com"
        );
    }

    #[test]
    fn test_records_parse_rdata_dispatch() {
        let cases = [
            ("MyYvvw", RecordType::A),
            ("IAFB0AMCEQAAAAAAAArY8Q", RecordType::Aaaa),
            ("BWVycm9sEGJyZW5kYW5hYm9saXZpZXIDY29tAA", RecordType::Cname),
            ("AAEDbXgzA292aANuZXQA", RecordType::Mx),
            ("AAoAACEABGNoYXQJYWJvbGl2aWVyA2J6aAA", RecordType::Srv),
            ("BW5zMjAwB2FueWNhc3QCbWUA", RecordType::Ns),
            ("HzR8aHR0cHM6Ly9icmVuZGFuLmFib2xpdmllci5iemg", RecordType::Txt),
            (
                "BmRuczIwMAdhbnljYXN0Am1lAAR0ZWNoA292aANuZXQAeFfPoAABUYAAAA4QADbugAAAASw",
                RecordType::Soa,
            ),
            ("BmFyYWdvZxBicmVuZGFuYWJvbGl2aWVyA2NvbQA", RecordType::Ptr),
        ];

        for (b64, record_type) in cases {
            let bytes = rdata(b64);
            let parsed = parse_rdata(record_type, DnsClass::Any, &bytes, &bytes)
                .unwrap()
                .unwrap();
            assert_eq!(parsed.record_type(), record_type);
        }
    }

    #[test]
    fn test_records_parse_rdata_internet_only_types() {
        let bytes = rdata("MyYvvw");

        assert!(parse_rdata(RecordType::A, DnsClass::In, &bytes, &bytes).unwrap().is_some());
        assert_eq!(parse_rdata(RecordType::A, DnsClass::Ch, &bytes, &bytes), Ok(None));
        assert_eq!(parse_rdata(RecordType::Aaaa, DnsClass::Hs, &bytes, &bytes), Ok(None));
        assert_eq!(parse_rdata(RecordType::Unknown(99), DnsClass::In, &bytes, &bytes), Ok(None));
    }

    #[test]
    fn test_records_short_rdata_is_corrupted() {
        assert_eq!(parse_a(&[1, 2, 3]), Err(DecodeQueryErrors::Corrupted));
        assert_eq!(parse_aaaa(&[0; 15]), Err(DecodeQueryErrors::Corrupted));
        assert_eq!(parse_mx(&[0], &[0]), Err(DecodeQueryErrors::Corrupted));
        assert_eq!(parse_srv(&[0, 1, 0, 0, 0], &[0]), Err(DecodeQueryErrors::Corrupted));
        assert_eq!(parse_txt(&[]), Err(DecodeQueryErrors::Corrupted));
        assert_eq!(parse_txt(&[5, b'a']), Err(DecodeQueryErrors::Corrupted));
        assert_eq!(parse_cname(&[], &[]), Err(DecodeQueryErrors::Corrupted));

        // two root names followed by 19 bytes instead of 20
        let mut soa = vec![0, 0];
        soa.extend_from_slice(&[0; 19]);
        assert_eq!(parse_soa(&soa, &soa), Err(DecodeQueryErrors::Corrupted));
    }

    #[test]
    fn test_records_compressed_name_resolved_against_message() {
        // message holds "ovh.net" at offset 0; the MX exchange points back at it
        let mut message = Vec::new();
        MessageCompressor::encode_name("ovh.net", &mut message).unwrap();
        let rdata = [0x00, 0x0A, 3, b'm', b'x', b'3', 0xC0, 0x00];

        let rec = parse_mx(&rdata, &message).unwrap();
        assert_eq!(rec.preference, 10);
        assert_eq!(rec.exchange, "mx3.ovh.net");
    }
}
