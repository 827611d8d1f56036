use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid upstream address: {0}")]
    InvalidUpstreamAddress(String),

    #[error("Unsupported upstream scheme '{scheme}' in {address}")]
    UnsupportedScheme { scheme: String, address: String },

    #[error("Invalid DNS query: {0}")]
    InvalidDnsQuery(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("Transport connection reset by {server}")]
    TransportConnectionReset { server: String },
}

impl DomainError {
    /// Maps an I/O failure against `server` onto the transport taxonomy.
    pub fn from_io(server: &str, context: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => Self::TransportTimeout {
                server: server.to_string(),
            },
            std::io::ErrorKind::ConnectionRefused => Self::TransportConnectionRefused {
                server: server.to_string(),
            },
            std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted => {
                Self::TransportConnectionReset {
                    server: server.to_string(),
                }
            }
            _ => Self::IoError(format!("{} {}: {}", context, server, err)),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TransportTimeout { .. })
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::TransportTimeout { .. }
                | Self::TransportConnectionRefused { .. }
                | Self::TransportConnectionReset { .. }
                | Self::IoError(_)
        )
    }
}
