//! # DNS Errors
//!
//! Every layer of the client reports failures through its own enum:
//!
//! - [`EncodeErrors`]: the caller asked for a name that cannot be written on the wire.
//! - [`DecodeQueryErrors`]: the response message is not something the decoder accepts,
//!   either because of its header, because the server reported an error through RCODE,
//!   or because the bytes are corrupted.
//! - [`TransportErrors`]: the DNS-over-HTTPS exchange failed (`tokio-dep`).
//! - [`ResolverErrors`]: top-level errors returned by the lookup functions (`tokio-dep`).
//!
//! All of them implement `Display` and `Error`, and convert into [`ResolverErrors`] with `?`.

use thiserror::Error;

/// Errors raised while encoding a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeErrors {
    #[error("Label too long (>63): {0}")]
    LabelTooLong(String),
    #[error("Name contains an empty label: {0:?}")]
    EmptyLabel(String),
    #[error("Name is too long (>255 octets once encoded): {0}")]
    NameTooLong(String),
    #[error("Name must be ASCII: {0}")]
    NonAsciiName(String),
}

/// Errors a name server reports through the RCODE header field (RFC 1035 §4.1.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServerErrors {
    /// The name server was unable to interpret the query.
    #[error("Format error")]
    FormatError,
    /// The name server was unable to process this query due to a problem with the name server.
    #[error("Server failure")]
    ServerFailure,
    /// The domain name referenced in the query does not exist.
    #[error("Name error")]
    NameError,
    /// The name server does not support the requested kind of query.
    #[error("Not implemented")]
    NotImplemented,
    /// The name server refuses to perform the specified operation for policy reasons.
    #[error("Refused")]
    Refused,
}

impl ServerErrors {
    /// Maps a non-zero RCODE to its error. Returns `None` for 0 and for codes outside 1..=5.
    pub fn from_rcode(rcode: u8) -> Option<Self> {
        match rcode {
            1 => Some(ServerErrors::FormatError),
            2 => Some(ServerErrors::ServerFailure),
            3 => Some(ServerErrors::NameError),
            4 => Some(ServerErrors::NotImplemented),
            5 => Some(ServerErrors::Refused),
            _ => None,
        }
    }

    pub fn rcode(self) -> u8 {
        match self {
            ServerErrors::FormatError => 1,
            ServerErrors::ServerFailure => 2,
            ServerErrors::NameError => 3,
            ServerErrors::NotImplemented => 4,
            ServerErrors::Refused => 5,
        }
    }
}

/// Errors raised while decoding a response message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeQueryErrors {
    #[error("the message the server sent us isn't a response")]
    NotAResponse,
    #[error("only standard queries are supported")]
    NotStandardQuery,
    #[error("truncated messages aren't supported")]
    Truncated,
    #[error("{0}")]
    Server(ServerErrors),
    #[error("the message the server sent is empty, incomplete, or corrupted")]
    Corrupted,
    #[error("no parser for record type {record_type} in class {class}")]
    UnsupportedRecord { record_type: u16, class: u16 },
}

impl DecodeQueryErrors {
    /// `true` for header states the decoder refuses to go past (QR, OPCODE, TC).
    pub fn is_protocol_state(&self) -> bool {
        matches!(
            self,
            DecodeQueryErrors::NotAResponse
                | DecodeQueryErrors::NotStandardQuery
                | DecodeQueryErrors::Truncated
        )
    }
}

impl From<ServerErrors> for DecodeQueryErrors {
    fn from(value: ServerErrors) -> Self {
        DecodeQueryErrors::Server(value)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "tokio-dep")] {
        use std::time::Duration;
        use crate::dns::resolver::message::DnsClass;

        /// Errors raised by a [`DnsTransport`](crate::dns::resolver::transporter::DnsTransport).
        #[derive(Debug, Error)]
        pub enum TransportErrors {
            #[error("DoH request to {url} failed: {source}")]
            Request { url: String, source: reqwest::Error },
            #[error("DoH server {url} returned HTTP {status}")]
            Status { url: String, status: u16 },
            #[error("Failed to read DoH response from {url}: {source}")]
            Body { url: String, source: reqwest::Error },
            #[error("Timeout after {0:?} waiting for the DoH server")]
            Timeout(Duration),
            #[error("The server {0} is invalid, expected an https:// URL")]
            InvalidServer(String),
            #[error("The server list is empty")]
            NoServers,
        }

        /// High-level errors returned by the lookup functions.
        #[derive(Debug, Error)]
        pub enum ResolverErrors {
            #[error(transparent)]
            Encode(#[from] EncodeErrors),
            #[error(transparent)]
            Transport(#[from] TransportErrors),
            #[error(transparent)]
            Decode(#[from] DecodeQueryErrors),
            #[error("class must be IN (Internet) or ANY (*), got {0}")]
            ClassMismatch(DnsClass),
            #[error("the lookup was cancelled")]
            Cancelled,
        }
    }
}
