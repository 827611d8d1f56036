use crate::DomainError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

/// Port assumed when a plain DNS upstream is configured without one.
pub const DEFAULT_DNS_PORT: u16 = 53;

/// Schemes that name encrypted upstream variants this crate does not provide.
const ENCRYPTED_SCHEMES: &[&str] = &["tls", "https", "quic", "doq", "h3", "sdns"];

/// A parsed plain DNS upstream: `host:port` plus the transport mode.
///
/// The `Display` form is the canonical upstream identifier: the bare address
/// for UDP-first upstreams and `tcp://address` for TCP-only upstreams.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpstreamSpec {
    address: Arc<str>,
    prefer_tcp: bool,
}

impl UpstreamSpec {
    pub fn new(address: impl Into<Arc<str>>, prefer_tcp: bool) -> Self {
        Self {
            address: address.into(),
            prefer_tcp,
        }
    }

    /// The `host:port` string handed to the transport layer.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn prefer_tcp(&self) -> bool {
        self.prefer_tcp
    }

    pub fn with_prefer_tcp(&self, prefer_tcp: bool) -> Self {
        Self {
            address: self.address.clone(),
            prefer_tcp,
        }
    }
}

impl fmt::Display for UpstreamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefer_tcp {
            write!(f, "tcp://{}", self.address)
        } else {
            write!(f, "{}", self.address)
        }
    }
}

fn invalid(addr: &str, reason: &str) -> DomainError {
    DomainError::InvalidUpstreamAddress(format!("'{}': {}", addr, reason))
}

/// Normalizes `host`, `host:port`, `ip`, `[ipv6]` and `[ipv6]:port` into a
/// `host:port` string, appending the default DNS port when none is given.
fn with_default_port(s: &str) -> Result<String, DomainError> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr.to_string());
    }
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_DNS_PORT).to_string());
    }

    if let Some(rest) = s.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| invalid(s, "missing closing bracket"))?;
        let ip: IpAddr = rest[..end]
            .parse()
            .map_err(|_| invalid(s, "bracketed host must be an IPv6 address"))?;
        let tail = &rest[end + 1..];
        let port = match tail.strip_prefix(':') {
            Some(port_str) => port_str
                .parse::<u16>()
                .map_err(|_| invalid(s, "invalid port"))?,
            None if tail.is_empty() => DEFAULT_DNS_PORT,
            None => return Err(invalid(s, "unexpected characters after host")),
        };
        return Ok(SocketAddr::new(ip, port).to_string());
    }

    let (host, port) = match s.rsplit_once(':') {
        Some((host, port_str)) => {
            let port = port_str
                .parse::<u16>()
                .map_err(|_| invalid(s, "invalid port"))?;
            (host, port)
        }
        None => (s, DEFAULT_DNS_PORT),
    };

    if host.is_empty() {
        return Err(invalid(s, "empty host"));
    }
    if host.contains(|c: char| c.is_whitespace() || c == '/' || c == ':') {
        return Err(invalid(s, "malformed host"));
    }

    Ok(format!("{}:{}", host, port))
}

impl FromStr for UpstreamSpec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::InvalidUpstreamAddress(
                "empty upstream address".to_string(),
            ));
        }

        let (prefer_tcp, rest) = match s.split_once("://") {
            Some((scheme, rest)) => {
                let scheme = scheme.to_ascii_lowercase();
                match scheme.as_str() {
                    "udp" => (false, rest),
                    "tcp" => (true, rest),
                    _ => {
                        return Err(DomainError::UnsupportedScheme {
                            scheme: if ENCRYPTED_SCHEMES.contains(&scheme.as_str()) {
                                scheme
                            } else {
                                format!("{} (unknown)", scheme)
                            },
                            address: s.to_string(),
                        })
                    }
                }
            }
            None => (false, s),
        };

        if rest.is_empty() {
            return Err(invalid(s, "missing host"));
        }

        let address = with_default_port(rest)?;
        Ok(Self::new(address, prefer_tcp))
    }
}
