use crate::{DomainError, UpstreamSpec};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Nameserver address: `host:port`, `udp://host:port` or `tcp://host:port`.
    #[serde(default = "default_address")]
    pub address: String,

    /// Budget for each network attempt, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Skip UDP and always query over TCP.
    #[serde(default)]
    pub prefer_tcp: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            timeout_ms: default_timeout_ms(),
            prefer_tcp: false,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parses `address`; `prefer_tcp = true` forces TCP even for a bare address.
    pub fn to_spec(&self) -> Result<UpstreamSpec, DomainError> {
        let spec: UpstreamSpec = self.address.parse()?;
        if self.prefer_tcp && !spec.prefer_tcp() {
            return Ok(spec.with_prefer_tcp(true));
        }
        Ok(spec)
    }
}

fn default_address() -> String {
    "8.8.8.8:53".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}
