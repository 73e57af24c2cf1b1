//! Inbound webhook payload schemas.
//!
//! These mirror the JSON the platform POSTs to the webhook endpoint. Only the
//! fields the dispatcher branches on are typed; message content is kept as
//! raw JSON under its type key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root webhook payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Notification {
    /// Typically "whatsapp_business_account".
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Entry {
    /// Business account id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Change {
    /// "messages" or "calls" for the events handled here.
    pub field: String,
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChangeValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_product: Option<String>,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<InboundMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<Status>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls: Option<Vec<Call>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_phone_number: Option<String>,
    /// Id of the business phone number that received the event.
    pub phone_number_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    pub wa_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Context of a message sent as a reply.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InboundMessage {
    pub from: String,
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
    /// Everything else, including the object stored under `kind`.
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl InboundMessage {
    /// Object stored under the message type key, e.g. `{"body": ...}` for text.
    pub fn body(&self) -> Option<&Value> {
        self.content.get(&self.kind)
    }

    /// Body of a text message.
    pub fn text(&self) -> Option<&str> {
        self.content.get("text")?.get("body")?.as_str()
    }
}

/// Delivery status of a sent message, or of a call when `kind` is "call".
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Status {
    pub id: String,
    pub status: String,
    pub timestamp: String,
    pub recipient_id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biz_opaque_callback_data: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Call {
    pub id: String,
    pub from: String,
    pub to: String,
    /// "connect" or "terminate".
    pub event: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    /// SDP offer sent with a connect event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<CallSession>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CallSession {
    pub sdp_type: String,
    pub sdp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_deserialization() {
        let json = r#"{
            "from": "5511999",
            "id": "wamid.1",
            "timestamp": "1700000000",
            "type": "text",
            "text": {"body": "hello"}
        }"#;
        let message: InboundMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.kind, "text");
        assert_eq!(message.text(), Some("hello"));
        assert_eq!(message.body().unwrap()["body"], "hello");
    }

    #[test]
    fn test_status_with_errors() {
        let json = r#"{
            "id": "wamid.2",
            "status": "failed",
            "timestamp": "1700000001",
            "recipient_id": "5511999",
            "errors": [{"code": 131047, "title": "Re-engagement message"}]
        }"#;
        let status: Status = serde_json::from_str(json).unwrap();
        assert_eq!(status.errors.unwrap()[0]["code"], 131047);
        assert!(status.conversation.is_none());
    }
}
