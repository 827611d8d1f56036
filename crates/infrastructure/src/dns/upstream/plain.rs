//! Plain DNS upstream (RFC 1035 §4.2, RFC 7766)
//!
//! Queries go over UDP first. A reply with the TC bit set is retried exactly
//! once over TCP; with `prefer_tcp` the UDP step is skipped entirely. Every
//! attempt creates its own transport client and gets the full timeout.

use super::Upstream;
use crate::dns::events::{AttemptEvent, AttemptEventEmitter};
use crate::dns::transport::{DnsTransport, NetworkConnector, TransportConnector};
use crate::dns::wire::{MessageBuilder, ResponseParser, MAX_MSG_SIZE};
use async_trait::async_trait;
use hickory_proto::op::Message;
use plain_upstream_domain::{DomainError, UpstreamSpec};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub struct PlainUpstream {
    address: String,
    timeout: Duration,
    prefer_tcp: bool,
    connector: Arc<dyn TransportConnector>,
    emitter: AttemptEventEmitter,
}

/// Per-exchange values shared by the primary attempt and the fallback.
struct Exchange<'a> {
    upstream: Arc<str>,
    question: Arc<str>,
    query_id: u16,
    wire: &'a [u8],
}

/// Result of one attempt plus the TC bit read from the raw reply header.
///
/// `truncated` is set even when the body failed to decode.
struct Attempt {
    result: Result<Message, DomainError>,
    truncated: bool,
}

impl PlainUpstream {
    pub fn new(address: impl Into<String>, timeout: Duration, prefer_tcp: bool) -> Self {
        Self {
            address: address.into(),
            timeout,
            prefer_tcp,
            connector: Arc::new(NetworkConnector),
            emitter: AttemptEventEmitter::new_disabled(),
        }
    }

    pub fn from_spec(spec: &UpstreamSpec, timeout: Duration) -> Self {
        Self::new(spec.address(), timeout, spec.prefer_tcp())
    }

    pub fn with_connector(mut self, connector: Arc<dyn TransportConnector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_emitter(mut self, emitter: AttemptEventEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// The `host:port` handed to the transports, without any scheme.
    pub fn server(&self) -> &str {
        &self.address
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn prefer_tcp(&self) -> bool {
        self.prefer_tcp
    }

    async fn attempt(
        &self,
        transport: &dyn DnsTransport,
        exchange: &Exchange<'_>,
    ) -> Attempt {
        let protocol = transport.protocol_name();
        self.log_begin(protocol, exchange);

        let start = Instant::now();
        let (result, truncated) = match transport.send(exchange.wire, self.timeout).await {
            Ok(response) => (
                ResponseParser::parse(&response.bytes),
                ResponseParser::is_truncated(&response.bytes),
            ),
            Err(e) => (Err(e), false),
        };

        self.log_finish(protocol, exchange, start.elapsed(), result.as_ref().err());
        Attempt { result, truncated }
    }

    fn log_begin(&self, protocol: &'static str, exchange: &Exchange<'_>) {
        debug!(
            upstream = %exchange.upstream,
            protocol,
            id = exchange.query_id,
            question = %exchange.question,
            "Sending DNS query"
        );

        self.emitter.emit(AttemptEvent::Begin {
            server: exchange.upstream.clone(),
            protocol,
            question: exchange.question.clone(),
            query_id: exchange.query_id,
        });
    }

    fn log_finish(
        &self,
        protocol: &'static str,
        exchange: &Exchange<'_>,
        elapsed: Duration,
        error: Option<&DomainError>,
    ) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        match error {
            Some(e) => debug!(
                upstream = %exchange.upstream,
                protocol,
                question = %exchange.question,
                elapsed_ms,
                error = %e,
                "DNS query failed"
            ),
            None => debug!(
                upstream = %exchange.upstream,
                protocol,
                question = %exchange.question,
                elapsed_ms,
                "DNS answer received"
            ),
        }

        self.emitter.emit(AttemptEvent::Finish {
            server: exchange.upstream.clone(),
            protocol,
            question: exchange.question.clone(),
            elapsed,
            error: error.cloned(),
        });
    }
}

#[async_trait]
impl Upstream for PlainUpstream {
    fn address(&self) -> String {
        if self.prefer_tcp {
            format!("tcp://{}", self.address)
        } else {
            self.address.clone()
        }
    }

    async fn exchange(&self, query: &Message) -> Result<Message, DomainError> {
        let question = MessageBuilder::question(query)
            .ok_or_else(|| DomainError::InvalidDnsQuery("query has no question".to_string()))?;
        let wire = MessageBuilder::to_wire(query)?;

        let exchange = Exchange {
            upstream: self.address().into(),
            question: question.into(),
            query_id: query.id(),
            wire: &wire,
        };

        if self.prefer_tcp {
            let tcp = self.connector.tcp(&self.address);
            return self.attempt(tcp.as_ref(), &exchange).await.result;
        }

        let udp = self.connector.udp(&self.address, MAX_MSG_SIZE);
        let udp_attempt = self.attempt(udp.as_ref(), &exchange).await;

        if !udp_attempt.truncated {
            return udp_attempt.result;
        }

        trace!(
            upstream = %exchange.upstream,
            question = %exchange.question,
            decoded = udp_attempt.result.is_ok(),
            "Truncated message was received, retrying over TCP"
        );

        let tcp = self.connector.tcp(&self.address);
        self.attempt(tcp.as_ref(), &exchange).await.result
    }

    fn reset(&self) {}
}

impl std::fmt::Debug for PlainUpstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlainUpstream")
            .field("address", &self.address)
            .field("timeout", &self.timeout)
            .field("prefer_tcp", &self.prefer_tcp)
            .finish_non_exhaustive()
    }
}
