pub mod emitter;
pub mod types;

pub use emitter::AttemptEventEmitter;
pub use types::AttemptEvent;
