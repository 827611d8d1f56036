#![allow(dead_code)]
pub mod builders;
pub mod dns_server_mock;

pub use builders::{QueryBuilder, TCP_ANSWER, UDP_ANSWER};
pub use dns_server_mock::{MockDnsServer, TcpBehavior, UdpBehavior};
