#![allow(dead_code)]

use async_trait::async_trait;
use doh_client::dns::compressor::MessageCompressor;
use doh_client::dns::errors::TransportErrors;
use doh_client::dns::resolver::message::HeaderSection;
use doh_client::dns::resolver::transporter::DnsTransport;
use std::sync::Mutex;
use std::time::Duration;

/// What the mock does with the next query.
#[derive(Clone)]
pub enum Behaviour {
    /// Answers with these bytes, ID rewritten to the query's.
    Respond(Vec<u8>),
    /// Answers with these bytes untouched.
    RespondRaw(Vec<u8>),
    /// Fails as if the server returned this HTTP status.
    Status(u16),
    /// Never answers.
    Hang,
}

pub struct MockTransport {
    behaviour: Behaviour,
    queries: Mutex<Vec<Vec<u8>>>,
}

impl MockTransport {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn responding(message: Vec<u8>) -> Self {
        Self::new(Behaviour::Respond(message))
    }

    pub fn queries(&self) -> Vec<Vec<u8>> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl DnsTransport for MockTransport {
    async fn exchange(&self, query: &[u8], _timeout: Duration) -> Result<Vec<u8>, TransportErrors> {
        self.queries.lock().unwrap().push(query.to_vec());

        match &self.behaviour {
            Behaviour::Respond(message) => {
                let mut response = message.clone();
                response[0..2].copy_from_slice(&query[0..2]);
                Ok(response)
            }
            Behaviour::RespondRaw(message) => Ok(message.clone()),
            Behaviour::Status(status) => Err(TransportErrors::Status {
                url: "mock".to_string(),
                status: *status,
            }),
            Behaviour::Hang => std::future::pending().await,
        }
    }

    fn protocol_name(&self) -> &'static str {
        "MOCK"
    }
}

/// One answer to put in a built response. The owner name is always the question name.
pub struct RawAnswer {
    pub record_type: u16,
    pub class: u16,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

impl RawAnswer {
    pub fn new(record_type: u16, ttl: u32, rdata: Vec<u8>) -> Self {
        Self {
            record_type,
            class: 1,
            ttl,
            rdata,
        }
    }
}

/// Builds a NOERROR response to `qname` holding `answers`.
pub fn response(qname: &str, qtype: u16, answers: &[RawAnswer]) -> Vec<u8> {
    response_with_flags(0x8180, qname, qtype, answers)
}

pub fn response_with_flags(flags: u16, qname: &str, qtype: u16, answers: &[RawAnswer]) -> Vec<u8> {
    let header = HeaderSection {
        id: 0,
        flags,
        qd_count: 1,
        an_count: answers.len() as u16,
        ns_count: 0,
        ar_count: 0,
    };
    let mut message = header.to_bytes().to_vec();
    MessageCompressor::encode_name(qname, &mut message).unwrap();
    message.extend_from_slice(&qtype.to_be_bytes());
    message.extend_from_slice(&1u16.to_be_bytes());

    for answer in answers {
        // pointer to the question name
        message.extend_from_slice(&[0xC0, 0x0C]);
        message.extend_from_slice(&answer.record_type.to_be_bytes());
        message.extend_from_slice(&answer.class.to_be_bytes());
        message.extend_from_slice(&answer.ttl.to_be_bytes());
        message.extend_from_slice(&(answer.rdata.len() as u16).to_be_bytes());
        message.extend_from_slice(&answer.rdata);
    }
    message
}

/// Uncompressed wire form of `name`.
pub fn name(name: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    MessageCompressor::encode_name(name, &mut bytes).unwrap();
    bytes
}

/// Reads the question name, type and class back out of an encoded query.
pub fn question(query: &[u8]) -> (String, u16, u16) {
    let (qname, consumed) = MessageCompressor::decompress(query, 12, query).unwrap();
    let at = 12 + consumed;
    let qtype = u16::from_be_bytes([query[at], query[at + 1]]);
    let qclass = u16::from_be_bytes([query[at + 2], query[at + 3]]);
    (qname, qtype, qclass)
}
