mod bus;
mod types;

pub use bus::{message_bus, CommandQueue, EngineHandle, DEFAULT_QUEUE_CAPACITY};
pub use types::{CommandError, EngineCommand};
