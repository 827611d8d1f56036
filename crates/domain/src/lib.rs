//! Plain DNS upstream domain layer
pub mod config;
pub mod errors;
pub mod upstream_spec;

pub use config::{CliOverrides, Config, ConfigError, LoggingConfig, UpstreamConfig};
pub use errors::DomainError;
pub use upstream_spec::{UpstreamSpec, DEFAULT_DNS_PORT};
