pub mod errors;
pub mod logging;
pub mod root;
pub mod upstream;

pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use upstream::UpstreamConfig;
