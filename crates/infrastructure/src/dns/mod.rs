pub mod events;
pub mod transport;
pub mod upstream;
pub mod wire;

pub use events::{AttemptEvent, AttemptEventEmitter};
pub use transport::{DnsTransport, NetworkConnector, TransportConnector, TransportResponse};
pub use upstream::{create_upstream, PlainUpstream, Upstream, UpstreamOptions};
pub use wire::{MessageBuilder, ResponseParser};
