//! Upstream abstraction shared by every DNS transport variant.
//!
//! The resolver holds upstreams as `Arc<dyn Upstream>` and never needs to
//! know which protocol sits behind one. Only plain DNS (UDP with TCP
//! fallback, or TCP only) is provided here.

pub mod plain;

use crate::dns::events::AttemptEventEmitter;
use crate::dns::transport::{NetworkConnector, TransportConnector};
use async_trait::async_trait;
use hickory_proto::op::Message;
use plain_upstream_domain::{DomainError, UpstreamSpec};
use std::sync::Arc;
use std::time::Duration;

pub use plain::PlainUpstream;

/// Timeout used when the caller does not configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[async_trait]
pub trait Upstream: Send + Sync {
    /// Canonical identifier of the upstream, including its scheme.
    fn address(&self) -> String;

    /// Sends `query` and returns the nameserver's reply.
    async fn exchange(&self, query: &Message) -> Result<Message, DomainError>;

    /// Discards any per-connection state held by the upstream.
    fn reset(&self);
}

/// Settings shared by every upstream built through [`create_upstream`].
#[derive(Clone)]
pub struct UpstreamOptions {
    pub timeout: Duration,

    pub connector: Arc<dyn TransportConnector>,

    pub emitter: AttemptEventEmitter,
}

impl UpstreamOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

impl Default for UpstreamOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connector: Arc::new(NetworkConnector),
            emitter: AttemptEventEmitter::new_disabled(),
        }
    }
}

impl std::fmt::Debug for UpstreamOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamOptions")
            .field("timeout", &self.timeout)
            .field("emitter", &self.emitter)
            .finish_non_exhaustive()
    }
}

/// Builds an upstream from a user supplied address such as `8.8.8.8`,
/// `udp://1.1.1.1:53` or `tcp://dns.google:53`.
pub fn create_upstream(
    address: &str,
    options: &UpstreamOptions,
) -> Result<Arc<dyn Upstream>, DomainError> {
    let spec: UpstreamSpec = address.parse()?;
    Ok(upstream_from_spec(&spec, options))
}

pub fn upstream_from_spec(spec: &UpstreamSpec, options: &UpstreamOptions) -> Arc<dyn Upstream> {
    Arc::new(
        PlainUpstream::new(spec.address(), options.timeout, spec.prefer_tcp())
            .with_connector(options.connector.clone())
            .with_emitter(options.emitter.clone()),
    )
}
