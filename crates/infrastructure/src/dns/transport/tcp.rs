//! TCP Transport for DNS queries (RFC 1035 §4.2.2)
//!
//! Every message is framed with a 2-byte big-endian length prefix. A new
//! connection is opened for each query and dropped after the response.

use super::{resolve_server, DnsTransport, TransportResponse};
use crate::dns::wire::MAX_MSG_SIZE;
use async_trait::async_trait;
use bytes::Bytes;
use plain_upstream_domain::DomainError;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

pub struct TcpTransport {
    server: String,
}

impl TcpTransport {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    async fn connect(&self) -> Result<TcpStream, DomainError> {
        let server_addr = resolve_server(&self.server).await?;

        let stream = TcpStream::connect(server_addr)
            .await
            .map_err(|e| DomainError::from_io(&self.server, "Failed to connect to", &e))?;

        stream.set_nodelay(true).map_err(|e| {
            DomainError::IoError(format!(
                "Failed to set TCP_NODELAY on {}: {}",
                self.server, e
            ))
        })?;

        Ok(stream)
    }

    async fn round_trip(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError> {
        let mut stream = self.connect().await?;

        send_with_length_prefix(&mut stream, message_bytes, &self.server).await?;

        debug!(
            server = %self.server,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        let response_bytes = read_with_length_prefix(&mut stream, &self.server).await?;

        debug!(
            server = %self.server,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes: Bytes::from(response_bytes),
        })
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
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
        "TCP"
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
    server: &str,
) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::InvalidDnsQuery(format!(
            "Query too large for TCP framing: {} bytes (max {})",
            message_bytes.len(),
            MAX_MSG_SIZE
        ))
    })?;

    let mut framed = Vec::with_capacity(message_bytes.len() + 2);
    framed.extend_from_slice(&length.to_be_bytes());
    framed.extend_from_slice(message_bytes);

    stream
        .write_all(&framed)
        .await
        .map_err(|e| DomainError::from_io(server, "Failed to write DNS message to", &e))?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::from_io(server, "Failed to flush stream to", &e))?;

    Ok(())
}

pub(crate) async fn read_with_length_prefix<S>(
    stream: &mut S,
    server: &str,
) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| DomainError::from_io(server, "Failed to read response length from", &e))?;

    let response_len = u16::from_be_bytes(len_buf) as usize;
    if response_len == 0 {
        return Err(DomainError::InvalidDnsResponse(format!(
            "Empty TCP response from {}",
            server
        )));
    }

    let mut response = vec![0u8; response_len];
    stream
        .read_exact(&mut response)
        .await
        .map_err(|e| DomainError::from_io(server, "Failed to read response body from", &e))?;

    Ok(response)
}
