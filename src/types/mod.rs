//! Inbound types: webhook payload schemas and the events built from them.

mod events;
mod payload;

pub use events::*;
pub use payload::*;
