//! whatsapp-cloud: WhatsApp Cloud API messages and webhooks.
//!
//! ## Modules
//!
//! - `message` - Validated outbound message builders
//! - `types` - Inbound webhook payloads and events
//! - `webhook` - Verification handshake, signature checks and dispatch
//! - `client` - Sending messages and managing calls
//! - `config` - Configuration management

pub mod message;
pub mod transport;
pub mod types;
pub mod webhook;

mod client;
mod config;
mod error;

pub use client::{
    envelope, CallAction, Client, MessageStatus, SendOptions, SendResponse, SentContact,
    SentMessage,
};
pub use config::CloudConfig;
pub use error::{Error, ProtocolError, Result, SecurityError, TransportError, ValidationError};
pub use message::{Message, MessageType};
pub use webhook::{Dispatcher, Handlers, VerifyQuery};
