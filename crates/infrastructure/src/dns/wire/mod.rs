pub mod message_builder;
pub mod response_parser;

pub use message_builder::MessageBuilder;
pub use response_parser::ResponseParser;

/// Largest DNS message the protocol can express (RFC 1035 length field).
pub const MAX_MSG_SIZE: usize = 65535;
