pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use plain_upstream_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Bytes,
}

/// One send-and-receive round trip against a single nameserver.
///
/// `timeout` bounds the whole attempt: resolution, connect, write and read.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

/// Creates a fresh transport client for every attempt.
pub trait TransportConnector: Send + Sync {
    fn udp(&self, server: &str, max_response_size: usize) -> Box<dyn DnsTransport>;

    fn tcp(&self, server: &str) -> Box<dyn DnsTransport>;
}

/// Connector backed by real tokio sockets.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkConnector;

impl TransportConnector for NetworkConnector {
    fn udp(&self, server: &str, max_response_size: usize) -> Box<dyn DnsTransport> {
        Box::new(udp::UdpTransport::new(server, max_response_size))
    }

    fn tcp(&self, server: &str) -> Box<dyn DnsTransport> {
        Box::new(tcp::TcpTransport::new(server))
    }
}

/// Resolves a `host:port` string to the first socket address it maps to.
pub(crate) async fn resolve_server(server: &str) -> Result<SocketAddr, DomainError> {
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }

    tokio::net::lookup_host(server)
        .await
        .map_err(|e| DomainError::from_io(server, "Failed to resolve", &e))?
        .next()
        .ok_or_else(|| {
            DomainError::InvalidUpstreamAddress(format!("'{}' resolved to no addresses", server))
        })
}
