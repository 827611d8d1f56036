//! Plain DNS upstream: wire codec, UDP/TCP transports and the exchange logic.
pub mod dns;
