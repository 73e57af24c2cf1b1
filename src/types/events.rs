//! Events produced by the webhook dispatcher.
//!
//! Every event records the business phone number id that received it, the
//! counterparty, and the full parsed payload. Events that can be acted upon
//! keep a handle to the [`Client`] so handlers can reply directly.

use std::sync::Arc;

use serde_json::Value;

use super::payload::{Call, InboundMessage};
use crate::client::{CallAction, Client, SendOptions, SendResponse};
use crate::error::Result;
use crate::message::Message;

/// A user sent a message to the business.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Business phone number id.
    pub phone_id: String,
    /// Sender wa_id.
    pub from: String,
    /// Sender profile name, when shared.
    pub name: Option<String>,
    pub message: InboundMessage,
    pub raw: Arc<Value>,
    pub(crate) client: Arc<Client>,
}

impl IncomingMessage {
    /// Send `message` back to the sender.
    pub async fn reply(&self, message: impl Into<Message>) -> Result<SendResponse> {
        self.client
            .send_message(&self.phone_id, &self.from, &message.into(), SendOptions::default())
            .await
    }

    /// Send `message` back to the sender, quoting the received message.
    pub async fn reply_quoting(&self, message: impl Into<Message>) -> Result<SendResponse> {
        let options = SendOptions {
            context: Some(self.message.id.clone()),
            ..Default::default()
        };
        self.client
            .send_message(&self.phone_id, &self.from, &message.into(), options)
            .await
    }

    pub async fn mark_read(&self) -> Result<Value> {
        self.client.mark_as_read(&self.phone_id, &self.message.id).await
    }

    pub async fn block(&self) -> Result<Value> {
        self.client
            .block_users(&self.phone_id, &[self.from.clone()])
            .await
    }
}

/// Delivery status change of a message sent by the business.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub phone_id: String,
    /// User the message was sent to.
    pub recipient: String,
    /// sent, delivered, read or failed.
    pub status: String,
    /// Id of the message the status refers to.
    pub id: String,
    pub timestamp: String,
    pub conversation: Option<Value>,
    pub pricing: Option<Value>,
    /// First error reported for a failed message.
    pub error: Option<Value>,
    pub biz_opaque_callback_data: Option<String>,
    pub raw: Arc<Value>,
}

/// A user started a call to the business.
#[derive(Debug, Clone)]
pub struct CallConnect {
    pub phone_id: String,
    pub from: String,
    pub call: Call,
    pub raw: Arc<Value>,
    pub(crate) client: Arc<Client>,
}

impl CallConnect {
    /// Answer SDP sent back with pre-accept/accept.
    pub async fn pre_accept(&self, sdp: &str) -> Result<Value> {
        self.client
            .manage_call(&self.phone_id, &self.call.id, CallAction::PreAccept, Some(sdp))
            .await
    }

    pub async fn accept(&self, sdp: &str) -> Result<Value> {
        self.client
            .manage_call(&self.phone_id, &self.call.id, CallAction::Accept, Some(sdp))
            .await
    }

    pub async fn reject(&self) -> Result<Value> {
        self.client
            .manage_call(&self.phone_id, &self.call.id, CallAction::Reject, None)
            .await
    }

    pub async fn terminate(&self) -> Result<Value> {
        self.client
            .manage_call(&self.phone_id, &self.call.id, CallAction::Terminate, None)
            .await
    }
}

/// A call ended.
#[derive(Debug, Clone)]
pub struct CallTerminate {
    pub phone_id: String,
    pub from: String,
    pub call: Call,
    pub raw: Arc<Value>,
}

/// Status of an outgoing call (ringing, accepted, rejected).
#[derive(Debug, Clone)]
pub struct CallStatus {
    pub phone_id: String,
    pub recipient: String,
    pub status: String,
    pub id: String,
    pub timestamp: String,
    pub raw: Arc<Value>,
}

/// Any event the dispatcher can emit.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    IncomingMessage(IncomingMessage),
    StatusUpdate(StatusUpdate),
    CallConnect(CallConnect),
    CallTerminate(CallTerminate),
    CallStatus(CallStatus),
}

impl WebhookEvent {
    pub fn phone_id(&self) -> &str {
        match self {
            WebhookEvent::IncomingMessage(e) => &e.phone_id,
            WebhookEvent::StatusUpdate(e) => &e.phone_id,
            WebhookEvent::CallConnect(e) => &e.phone_id,
            WebhookEvent::CallTerminate(e) => &e.phone_id,
            WebhookEvent::CallStatus(e) => &e.phone_id,
        }
    }

    /// The user on the other side of the event.
    pub fn counterparty(&self) -> &str {
        match self {
            WebhookEvent::IncomingMessage(e) => &e.from,
            WebhookEvent::StatusUpdate(e) => &e.recipient,
            WebhookEvent::CallConnect(e) => &e.from,
            WebhookEvent::CallTerminate(e) => &e.from,
            WebhookEvent::CallStatus(e) => &e.recipient,
        }
    }

    pub fn raw(&self) -> &Value {
        match self {
            WebhookEvent::IncomingMessage(e) => &e.raw,
            WebhookEvent::StatusUpdate(e) => &e.raw,
            WebhookEvent::CallConnect(e) => &e.raw,
            WebhookEvent::CallTerminate(e) => &e.raw,
            WebhookEvent::CallStatus(e) => &e.raw,
        }
    }
}
