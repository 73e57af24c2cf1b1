//! Inbound webhook handling: handshake, signature checks and event routing.

mod dispatcher;
mod signature;

pub use dispatcher::{Dispatcher, Handler, Handlers, VerifyQuery};
pub use signature::{escape_unicode, sign, verify_signature};
