//! # DNS
//!
//! - `errors`: every error type of the crate, one enum per layer.
//! - `compressor`: domain name encoding and decompression of compressed names.
//! - `resolver`: the message model, the response decoder, the record parsers and,
//!   with `tokio-dep`, the DoH transport and the lookup façade.

pub mod compressor;
pub mod errors;
pub mod resolver;
