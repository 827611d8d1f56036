//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is (no framing). The receive buffer is sized by the
//! caller so EDNS(0) responses larger than 512 bytes are delivered whole.
//! If the response has the TC (truncated) bit set, the caller should retry via TCP.

use super::{resolve_server, DnsTransport, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use plain_upstream_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// DNS over UDP transport
pub struct UdpTransport {
    server: String,
    max_response_size: usize,
}

impl UdpTransport {
    pub fn new(server: impl Into<String>, max_response_size: usize) -> Self {
        Self {
            server: server.into(),
            max_response_size,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn max_response_size(&self) -> usize {
        self.max_response_size
    }

    async fn round_trip(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError> {
        if message_bytes.len() < 2 {
            return Err(DomainError::InvalidDnsQuery(format!(
                "Query for {} too short to carry an ID",
                self.server
            )));
        }

        let server_addr = resolve_server(&self.server).await?;

        // Bind to ephemeral port (0 = OS assigns)
        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DomainError::IoError(format!("Failed to bind UDP socket: {}", e)))?;

        // Connected sockets drop datagrams from other sources and surface ICMP errors
        socket
            .connect(server_addr)
            .await
            .map_err(|e| DomainError::from_io(&self.server, "Failed to connect UDP socket to", &e))?;

        let bytes_sent = socket
            .send(message_bytes)
            .await
            .map_err(|e| DomainError::from_io(&self.server, "Failed to send UDP query to", &e))?;

        debug!(server = %self.server, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; self.max_response_size];

        // Stray datagrams are skipped; the caller's timeout bounds the wait
        let bytes_received = loop {
            let len = socket.recv(&mut recv_buf).await.map_err(|e| {
                DomainError::from_io(&self.server, "Failed to receive UDP response from", &e)
            })?;

            match validate_response_id(message_bytes, &recv_buf[..len], &self.server) {
                Ok(()) => break len,
                Err(e) => debug!(server = %self.server, error = %e, "Ignoring UDP datagram"),
            }
        };
        recv_buf.truncate(bytes_received);

        debug!(server = %self.server, bytes_received, "UDP response received");

        Ok(TransportResponse {
            bytes: Bytes::from(recv_buf),
        })
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        tokio::time::timeout(timeout, self.round_trip(message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server.clone(),
            })?
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}

/// Checks that a response carries the query's transaction ID.
pub(crate) fn validate_response_id(
    query: &[u8],
    response: &[u8],
    server: &str,
) -> Result<(), DomainError> {
    if query.len() < 2 || response.len() < 2 {
        return Err(DomainError::InvalidDnsResponse(format!(
            "Message from {} too short to carry an ID",
            server
        )));
    }

    let query_id = u16::from_be_bytes([query[0], query[1]]);
    let response_id = u16::from_be_bytes([response[0], response[1]]);

    if query_id != response_id {
        return Err(DomainError::InvalidDnsResponse(format!(
            "DNS ID mismatch from {}: expected {:#06x}, got {:#06x}",
            server, query_id, response_id
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "udp_test.rs"]
mod tests;
