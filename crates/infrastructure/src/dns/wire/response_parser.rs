use hickory_proto::op::Message;
use plain_upstream_domain::DomainError;
use tracing::trace;

/// Fixed size of the DNS message header (RFC 1035 §4.1.1).
const HEADER_LEN: usize = 12;

/// TC bit in the third header byte.
const TC_MASK: u8 = 0x02;

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<Message, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        trace!(
            id = message.id(),
            rcode = ?message.response_code(),
            answers = message.answers().len(),
            truncated = message.truncated(),
            "DNS response parsed"
        );

        Ok(message)
    }

    /// Reads the TC bit straight from the header.
    ///
    /// A truncated datagram is often cut mid-record while its header still
    /// announces the full counts, so decoding fails even though the server
    /// clearly asked for a TCP retry.
    pub fn is_truncated(response_bytes: &[u8]) -> bool {
        response_bytes.len() >= HEADER_LEN && response_bytes[2] & TC_MASK != 0
    }
}
