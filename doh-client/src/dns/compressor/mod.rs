//! DNS Name Codec
//!
//! Domain names are carried on the wire as a sequence of labels, each one a length
//! octet followed by that many bytes, terminated by the zero-length root label
//! (RFC 1035 §3.1). A name, or the list of labels at the end of a name, may be
//! replaced by a 2-byte pointer to a prior occurrence of the same labels
//! (RFC 1035 §4.1.4).
//!
//! - [`MessageCompressor::encode_name`] writes names uncompressed. Queries carry a single
//!   question so there is never anything to point back to.
//! - [`MessageCompressor::decompress`] reads a name back, following pointers into the whole
//!   message.
//!
//! # Example
//!
//! ```rust
//! use doh_client::dns::compressor::MessageCompressor;
//!
//! let mut message = Vec::new();
//! MessageCompressor::encode_name("www.example.com", &mut message).unwrap();
//!
//! let (name, consumed) = MessageCompressor::decompress(&message, 0, &message).unwrap();
//! assert_eq!(name, "www.example.com");
//! assert_eq!(consumed, message.len());
//! ```
//!
//! # References
//! - RFC1035 §4.1.4 (Domain Name Representation and Compression)
//! - <https://datatracker.ietf.org/doc/html/rfc1035>

use crate::dns::errors::{DecodeQueryErrors, EncodeErrors};

/// Two top bits set on a length octet mark a compression pointer.
const POINTER_TAG: u8 = 0b1100_0000;

/// Longest label allowed by RFC 1035 §2.3.4.
pub const MAX_LABEL_LEN: usize = 63;

/// Longest encoded name, length octets and root label included (RFC 1035 §2.3.4).
pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MessageCompressor {}

impl MessageCompressor {
    /// Appends `name` to `message` as an uncompressed label sequence.
    ///
    /// A single trailing dot is accepted (`"example.com."`), and both `""` and `"."`
    /// encode the root name. Nothing is written when an error is returned.
    ///
    /// # Errors
    /// - [`EncodeErrors::NonAsciiName`] if the name holds non-ASCII characters.
    /// - [`EncodeErrors::EmptyLabel`] for names such as `"a..b"` or `".a"`.
    /// - [`EncodeErrors::LabelTooLong`] if a label is longer than 63 bytes.
    /// - [`EncodeErrors::NameTooLong`] if the encoded name exceeds 255 octets.
    pub fn encode_name(name: &str, message: &mut Vec<u8>) -> Result<(), EncodeErrors> {
        let trimmed = name.strip_suffix('.').unwrap_or(name);

        if trimmed.is_empty() {
            message.push(0);
            return Ok(());
        }

        if !trimmed.is_ascii() {
            return Err(EncodeErrors::NonAsciiName(name.to_string()));
        }

        // Every dot becomes a length octet, plus the first length octet and the root label.
        if trimmed.len() + 2 > MAX_NAME_LEN {
            return Err(EncodeErrors::NameTooLong(name.to_string()));
        }

        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(EncodeErrors::EmptyLabel(name.to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(EncodeErrors::LabelTooLong(label.to_string()));
            }
        }

        message.reserve(trimmed.len() + 2);
        for label in trimmed.split('.') {
            message.push(label.len() as u8);
            message.extend_from_slice(label.as_bytes());
        }
        message.push(0);
        Ok(())
    }

    /// Reference to RFC1035, page 30 (4.1.4)
    ///
    /// The pointer takes the form of a two octet sequence:
    ///
    ///   +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///   | 1  1|                OFFSET                   |
    ///   +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///
    /// The OFFSET field specifies an offset from the start of the message (i.e., the
    /// first octet of the ID field in the domain header).
    ///
    /// Reads the name starting at `buffer[offset]`. `buffer` may be the whole message or
    /// any slice of it (such as a record's RDATA); pointers are always resolved against
    /// `message`.
    ///
    /// Returns the dot-joined name and the number of bytes of `buffer` the name occupies
    /// from `offset`. Bytes read behind a pointer are not counted: a pointer always ends
    /// the name and counts for its 2 bytes.
    ///
    /// Every pointer after the first must land strictly before the previous pointer's
    /// target, so pointer loops are reported instead of followed forever.
    ///
    /// # Errors
    /// [`DecodeQueryErrors::Corrupted`] on any read past the end of `buffer` or
    /// `message`, on a pointer outside `message`, on a pointer that does not move
    /// backwards, and on the reserved `01`/`10` length prefixes.
    pub fn decompress(
        buffer: &[u8],
        offset: usize,
        message: &[u8],
    ) -> Result<(String, usize), DecodeQueryErrors> {
        let mut labels: Vec<String> = Vec::new();
        let mut source = buffer;
        let mut cursor = offset;
        // Fixed as soon as the first pointer is read.
        let mut consumed: Option<usize> = None;
        let mut last_target: Option<usize> = None;

        loop {
            let length = *source.get(cursor).ok_or(DecodeQueryErrors::Corrupted)?;

            match length & POINTER_TAG {
                0 if length == 0 => {
                    cursor += 1;
                    break;
                }
                0 => {
                    let start = cursor + 1;
                    let end = start + length as usize;
                    let label = source
                        .get(start..end)
                        .ok_or(DecodeQueryErrors::Corrupted)?;
                    labels.push(String::from_utf8_lossy(label).into_owned());
                    cursor = end;
                }
                POINTER_TAG => {
                    let low = *source.get(cursor + 1).ok_or(DecodeQueryErrors::Corrupted)?;
                    let target = u16::from_be_bytes([length & !POINTER_TAG, low]) as usize;

                    if target >= message.len() || last_target.is_some_and(|last| target >= last)
                    {
                        return Err(DecodeQueryErrors::Corrupted);
                    }

                    if consumed.is_none() {
                        consumed = Some(cursor + 2 - offset);
                    }
                    last_target = Some(target);
                    source = message;
                    cursor = target;
                }
                _ => return Err(DecodeQueryErrors::Corrupted),
            }
        }

        let consumed = consumed.unwrap_or(cursor - offset);
        Ok((labels.join("."), consumed))
    }
}
