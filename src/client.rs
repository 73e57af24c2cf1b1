use std::{fmt, sync::Arc};

use futures::future::join_all;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    config::CloudConfig,
    error::{Result, TransportError, ValidationError},
    message::{limits, Message},
    transport::{Method, Request, Transport, UreqTransport},
};

/// Cloud API client bound to one access token.
///
/// Cheap to share behind an [`Arc`]; the webhook dispatcher hands the same
/// instance to every event so handlers can answer directly.
#[derive(Clone)]
pub struct Client {
    config: CloudConfig,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url)
            .field("api_version", &self.config.api_version)
            .finish_non_exhaustive()
    }
}

/// Optional envelope fields of a sent message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Id of the message being replied to.
    pub context: Option<String>,
    /// Opaque data echoed back in status webhooks, up to 512 bytes.
    pub biz_opaque_callback_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentContact {
    pub input: String,
    pub wa_id: String,
}

/// Acceptance state reported for a sent message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Accepted,
    HeldForQualityAssessment,
    Paused,
    /// The field was absent or carried a value this crate does not know.
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: String,
    #[serde(default)]
    pub message_status: MessageStatus,
}

/// Answer of the `/messages` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub contacts: Vec<SentContact>,
    #[serde(default)]
    pub messages: Vec<SentMessage>,
}

impl SendResponse {
    /// Id of the first message, the one that was sent.
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallAction {
    PreAccept,
    Accept,
    Reject,
    Terminate,
}

impl CallAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallAction::PreAccept => "pre_accept",
            CallAction::Accept => "accept",
            CallAction::Reject => "reject",
            CallAction::Terminate => "terminate",
        }
    }
}

/// Build the full `/messages` request body for `message`.
pub fn envelope(
    to: &str,
    message: &Message,
    options: &SendOptions,
) -> Result<Value, ValidationError> {
    if to.is_empty() {
        return Err(ValidationError::Empty { field: "to" });
    }

    let kind = message.message_type();
    let mut body = json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
        "type": kind.as_str(),
    });

    if let Some(context) = &options.context {
        body["context"] = json!({ "message_id": context });
    }
    if let Some(data) = &options.biz_opaque_callback_data {
        if data.len() > limits::BIZ_OPAQUE_CALLBACK_DATA {
            return Err(ValidationError::TooLong {
                field: "biz_opaque_callback_data",
                max: limits::BIZ_OPAQUE_CALLBACK_DATA,
                actual: data.len(),
            });
        }
        body["biz_opaque_callback_data"] = Value::String(data.clone());
    }
    body[kind.as_str()] = message.build();

    Ok(body)
}

impl Client {
    /// Client backed by the default blocking HTTP agent.
    pub fn new(config: CloudConfig) -> Self {
        let transport = Arc::new(UreqTransport::new(&config.user_agent));
        Self { config, transport }
    }

    /// Client backed by a custom transport.
    pub fn with_transport(config: CloudConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    async fn call(&self, method: Method, phone_id: &str, path: &str, body: Value) -> Result<Value> {
        let request = Request {
            method,
            url: self.config.endpoint(phone_id, path),
            headers: vec![
                (
                    "Authorization".into(),
                    format!("Bearer {}", self.config.access_token),
                ),
                ("Content-Type".into(), "application/json".into()),
            ],
            body,
        };
        debug!("{} {}", method.as_str(), request.url);
        Ok(self.transport.execute(request).await?)
    }

    /// Send one message from `phone_id` to `to`.
    pub async fn send_message(
        &self,
        phone_id: &str,
        to: &str,
        message: &Message,
        options: SendOptions,
    ) -> Result<SendResponse> {
        let body = envelope(to, message, &options)?;
        debug!("sending {} message to {}", message.message_type(), to);
        let response = self.call(Method::Post, phone_id, "messages", body).await?;
        serde_json::from_value(response)
            .map_err(|e| TransportError::Decode(e.to_string()).into())
    }

    /// Send the same message to many recipients.
    ///
    /// Recipients go out in chunks of `batch_size`, each chunk concurrently,
    /// with `batch_delay` between chunks. Results keep the recipient order.
    pub async fn broadcast(
        &self,
        phone_id: &str,
        recipients: &[String],
        message: &Message,
    ) -> Vec<Result<SendResponse>> {
        let size = self.config.batch_size.max(1);
        let mut results = Vec::with_capacity(recipients.len());

        for (batch, chunk) in recipients.chunks(size).enumerate() {
            if batch > 0 {
                tokio::time::sleep(self.config.batch_delay()).await;
            }
            let sends = chunk
                .iter()
                .map(|to| self.send_message(phone_id, to, message, SendOptions::default()));
            results.extend(join_all(sends).await);
        }

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            "broadcast to {} recipients finished, {} failed",
            recipients.len(),
            failed
        );
        results
    }

    pub async fn mark_as_read(&self, phone_id: &str, message_id: &str) -> Result<Value> {
        let body = json!({
            "messaging_product": "whatsapp",
            "status": "read",
            "message_id": message_id,
        });
        self.call(Method::Post, phone_id, "messages", body).await
    }

    pub async fn block_users(&self, phone_id: &str, users: &[String]) -> Result<Value> {
        self.call(Method::Post, phone_id, "block_users", block_body(users))
            .await
    }

    pub async fn unblock_users(&self, phone_id: &str, users: &[String]) -> Result<Value> {
        self.call(Method::Delete, phone_id, "block_users", block_body(users))
            .await
    }

    /// Act on a call. `sdp` is the answer SDP for pre-accept and accept.
    pub async fn manage_call(
        &self,
        phone_id: &str,
        call_id: &str,
        action: CallAction,
        sdp: Option<&str>,
    ) -> Result<Value> {
        let mut body = json!({
            "messaging_product": "whatsapp",
            "call_id": call_id,
            "action": action.as_str(),
        });
        if let Some(sdp) = sdp {
            body["session"] = json!({ "sdp_type": "answer", "sdp": sdp });
        }
        self.call(Method::Post, phone_id, "calls", body).await
    }
}

fn block_body(users: &[String]) -> Value {
    let users: Vec<Value> = users.iter().map(|user| json!({ "user": user })).collect();
    json!({
        "messaging_product": "whatsapp",
        "block_users": users,
    })
}
