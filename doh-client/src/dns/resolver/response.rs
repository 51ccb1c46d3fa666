//! # Response Decoder
//!
//! Turns a raw response message into the ordered list of [`Answer`]s it carries.
//!
//! Decoding runs in four steps:
//!
//! 1. The message must hold at least the 12-byte header.
//! 2. Header gates, in order: QR must be set, OPCODE must be a standard query, TC must
//!    be clear, RCODE must be 0 (1..=5 map to [`ServerErrors`], anything else is
//!    corruption).
//! 3. The QDCOUNT questions are skipped to find the answer section.
//! 4. The ANCOUNT answers are read in wire order, each RDATA handed to its parser.
//!
//! Authority and additional sections are never walked.
//!
//! An answer whose (type, class) has no parser is kept with `data: None` by default.
//! [`UnknownRecordPolicy::Reject`] turns it into
//! [`DecodeQueryErrors::UnsupportedRecord`] instead.
//!
//! ```rust
//! use doh_client::dns::resolver::response::decode_response;
//! use doh_client::dns::errors::DecodeQueryErrors;
//!
//! assert_eq!(decode_response(&[]), Err(DecodeQueryErrors::Corrupted));
//! ```

use crate::dns::compressor::MessageCompressor;
use crate::dns::errors::{DecodeQueryErrors, ServerErrors};
use crate::dns::resolver::message::{
    DnsClass, DnsHeaderFlags, HEADER_LEN, HeaderSection, OpCodeOptions, RecordType,
};
use crate::dns::resolver::records::{RecordData, parse_rdata};
use tracing::{debug, trace};

/// TYPE, CLASS, TTL and RDLENGTH that follow an answer's owner name.
const RR_FIXED_LEN: usize = 10;

/// TYPE and CLASS that follow a question's name.
const QUESTION_FIXED_LEN: usize = 4;

/// One decoded answer record. Owns all its data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Answer {
    /// The domain name that owns this record.
    pub owner_name: String,
    pub record_type: RecordType,
    pub class: DnsClass,
    /// Time-to-live in seconds, as sent by the server.
    pub ttl: u32,
    /// Parsed RDATA, `None` when no parser exists for this type and class.
    pub data: Option<RecordData>,
}

/// What to do with an answer no parser exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownRecordPolicy {
    /// Keep the answer with `data: None` and carry on.
    #[default]
    Keep,
    /// Fail the whole decode with [`DecodeQueryErrors::UnsupportedRecord`].
    Reject,
}

/// Decodes a response message, keeping answers that have no parser.
///
/// # Errors
/// See [`decode_response_with`].
pub fn decode_response(message: &[u8]) -> Result<Vec<Answer>, DecodeQueryErrors> {
    decode_response_with(message, UnknownRecordPolicy::Keep)
}

/// Decodes a response message with an explicit [`UnknownRecordPolicy`].
///
/// # Errors
/// - [`DecodeQueryErrors::NotAResponse`], [`DecodeQueryErrors::NotStandardQuery`] and
///   [`DecodeQueryErrors::Truncated`] for the header gates.
/// - [`DecodeQueryErrors::Server`] for RCODE 1 to 5.
/// - [`DecodeQueryErrors::Corrupted`] for short or inconsistent messages and RCODE above 5.
/// - [`DecodeQueryErrors::UnsupportedRecord`] under [`UnknownRecordPolicy::Reject`].
///
/// No answers are returned alongside an error.
pub fn decode_response_with(
    message: &[u8],
    policy: UnknownRecordPolicy,
) -> Result<Vec<Answer>, DecodeQueryErrors> {
    let header = HeaderSection::from_bytes(message).ok_or(DecodeQueryErrors::Corrupted)?;
    check_header(&header)?;

    trace!(
        id = header.id,
        qd_count = header.qd_count,
        an_count = header.an_count,
        ns_count = header.ns_count,
        ar_count = header.ar_count,
        "decoding DNS response"
    );

    let mut cursor = HEADER_LEN;

    // Questions are only walked to reach the answer section.
    for _ in 0..header.qd_count {
        let (_, consumed) = MessageCompressor::decompress(message, cursor, message)?;
        cursor += consumed + QUESTION_FIXED_LEN;
        if cursor > message.len() {
            return Err(DecodeQueryErrors::Corrupted);
        }
    }

    let mut answers = Vec::with_capacity(header.an_count as usize);
    for _ in 0..header.an_count {
        let (answer, next) = read_answer(message, cursor, policy)?;
        answers.push(answer);
        cursor = next;
    }

    Ok(answers)
}

fn check_header(header: &HeaderSection) -> Result<(), DecodeQueryErrors> {
    let flags = DnsHeaderFlags::from_u16(header.flags);

    if !flags.qr {
        return Err(DecodeQueryErrors::NotAResponse);
    }
    if flags.opcode != OpCodeOptions::StandardQuery as u8 {
        return Err(DecodeQueryErrors::NotStandardQuery);
    }
    if flags.tc {
        return Err(DecodeQueryErrors::Truncated);
    }
    if flags.rcode != 0 {
        return Err(ServerErrors::from_rcode(flags.rcode)
            .map(DecodeQueryErrors::Server)
            .unwrap_or(DecodeQueryErrors::Corrupted));
    }
    Ok(())
}

/// Reads the answer starting at `cursor` and returns it with the offset of the next one.
fn read_answer(
    message: &[u8],
    cursor: usize,
    policy: UnknownRecordPolicy,
) -> Result<(Answer, usize), DecodeQueryErrors> {
    let (owner_name, consumed) = MessageCompressor::decompress(message, cursor, message)?;
    let fixed_start = cursor + consumed;

    let fixed: &[u8; RR_FIXED_LEN] = message
        .get(fixed_start..fixed_start + RR_FIXED_LEN)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(DecodeQueryErrors::Corrupted)?;

    let raw_type = u16::from_be_bytes([fixed[0], fixed[1]]);
    let raw_class = u16::from_be_bytes([fixed[2], fixed[3]]);
    let ttl = u32::from_be_bytes([fixed[4], fixed[5], fixed[6], fixed[7]]);
    let rd_length = u16::from_be_bytes([fixed[8], fixed[9]]) as usize;

    let rdata_start = fixed_start + RR_FIXED_LEN;
    let rdata = message
        .get(rdata_start..rdata_start + rd_length)
        .ok_or(DecodeQueryErrors::Corrupted)?;

    let record_type = RecordType::from(raw_type);
    let class = DnsClass::from(raw_class);
    let data = parse_rdata(record_type, class, rdata, message)?;

    if data.is_none() {
        if policy == UnknownRecordPolicy::Reject {
            return Err(DecodeQueryErrors::UnsupportedRecord {
                record_type: raw_type,
                class: raw_class,
            });
        }
        debug!(
            owner = %owner_name,
            record_type = %record_type,
            class = %class,
            "no parser for record, keeping it without data"
        );
    }

    let answer = Answer {
        owner_name,
        record_type,
        class,
        ttl,
        data,
    };
    Ok((answer, rdata_start + rd_length))
}
