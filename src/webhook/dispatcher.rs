use std::sync::Arc;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;

use super::signature::verify_signature;
use crate::{
    client::Client,
    error::{ProtocolError, Result, SecurityError},
    types::{
        CallConnect, CallStatus, CallTerminate, ChangeValue, IncomingMessage, StatusUpdate,
        WebhookEvent,
    },
};

/// Boxed callback for one event kind.
pub type Handler<E, R> = Box<dyn Fn(E) -> R + Send + Sync>;

/// Callbacks registered per event kind.
///
/// `R` is whatever the host wants back, e.g. `()` or a boxed future.
pub struct Handlers<R = ()> {
    message: Option<Handler<IncomingMessage, R>>,
    status: Option<Handler<StatusUpdate, R>>,
    call_connect: Option<Handler<CallConnect, R>>,
    call_terminate: Option<Handler<CallTerminate, R>>,
    call_status: Option<Handler<CallStatus, R>>,
}

impl<R> Default for Handlers<R> {
    fn default() -> Self {
        Self {
            message: None,
            status: None,
            call_connect: None,
            call_terminate: None,
            call_status: None,
        }
    }
}

impl<R> Handlers<R> {
    pub fn on_message<F>(mut self, handler: F) -> Self
    where
        F: Fn(IncomingMessage) -> R + Send + Sync + 'static,
    {
        self.message = Some(Box::new(handler));
        self
    }

    pub fn on_status<F>(mut self, handler: F) -> Self
    where
        F: Fn(StatusUpdate) -> R + Send + Sync + 'static,
    {
        self.status = Some(Box::new(handler));
        self
    }

    pub fn on_call_connect<F>(mut self, handler: F) -> Self
    where
        F: Fn(CallConnect) -> R + Send + Sync + 'static,
    {
        self.call_connect = Some(Box::new(handler));
        self
    }

    pub fn on_call_terminate<F>(mut self, handler: F) -> Self
    where
        F: Fn(CallTerminate) -> R + Send + Sync + 'static,
    {
        self.call_terminate = Some(Box::new(handler));
        self
    }

    pub fn on_call_status<F>(mut self, handler: F) -> Self
    where
        F: Fn(CallStatus) -> R + Send + Sync + 'static,
    {
        self.call_status = Some(Box::new(handler));
        self
    }
}

/// Query parameters of the GET verification handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Turns webhook requests into typed events and routes them to [`Handlers`].
///
/// The dispatcher is framework agnostic: the host server extracts the raw
/// body, the `x-hub-signature-256` header and the query string, then maps
/// errors to HTTP answers with `status_code()`.
pub struct Dispatcher<R = ()> {
    client: Arc<Client>,
    handlers: Handlers<R>,
}

impl<R> Dispatcher<R> {
    pub fn new(client: Arc<Client>, handlers: Handlers<R>) -> Self {
        Self { client, handlers }
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    /// Answer the subscription handshake with `hub.challenge`.
    pub fn verify(&self, query: &VerifyQuery) -> Result<String, SecurityError> {
        let expected = self
            .client
            .config()
            .verify_token
            .as_deref()
            .ok_or(SecurityError::MissingVerifyToken)?;

        let mode = query
            .mode
            .as_deref()
            .ok_or(SecurityError::MissingParams("hub.mode"))?;
        let token = query
            .verify_token
            .as_deref()
            .ok_or(SecurityError::MissingParams("hub.verify_token"))?;
        let challenge = query
            .challenge
            .as_deref()
            .ok_or(SecurityError::MissingParams("hub.challenge"))?;

        if mode != "subscribe" || token != expected {
            warn!("webhook verification failed for mode `{mode}`");
            return Err(SecurityError::TokenMismatch);
        }

        info!("webhook verified");
        Ok(challenge.to_string())
    }

    /// Handle a POSTed notification.
    ///
    /// Returns the handler's value, or `None` when no handler is registered
    /// for the event kind.
    pub fn post(&self, raw_body: Option<&str>, signature: Option<&str>) -> Result<Option<R>> {
        let raw_body = raw_body.ok_or(SecurityError::MissingRawBody)?;

        if self.client.config().secure {
            let signature = signature.ok_or(SecurityError::MissingSignature)?;
            let app_secret = self.client.config().app_secret.as_deref();
            if !verify_signature(raw_body, signature, app_secret)? {
                return Err(SecurityError::InvalidSignature.into());
            }
        }

        let event = self.parse(raw_body)?;
        Ok(self.dispatch(event))
    }

    /// Route an already parsed event.
    pub fn dispatch(&self, event: WebhookEvent) -> Option<R> {
        let handled = match event {
            WebhookEvent::IncomingMessage(e) => self.handlers.message.as_ref().map(|h| h(e)),
            WebhookEvent::StatusUpdate(e) => self.handlers.status.as_ref().map(|h| h(e)),
            WebhookEvent::CallConnect(e) => self.handlers.call_connect.as_ref().map(|h| h(e)),
            WebhookEvent::CallTerminate(e) => self.handlers.call_terminate.as_ref().map(|h| h(e)),
            WebhookEvent::CallStatus(e) => self.handlers.call_status.as_ref().map(|h| h(e)),
        };
        if handled.is_none() {
            debug!("no handler registered, event ignored");
        }
        handled
    }

    /// Parse a raw notification body into a single event.
    pub fn parse(&self, raw_body: &str) -> Result<WebhookEvent> {
        let raw: Value = serde_json::from_str(raw_body).map_err(ProtocolError::from)?;
        if raw.get("object").is_none() {
            return Err(ProtocolError::MissingObject.into());
        }
        let change = raw
            .pointer("/entry/0/changes/0")
            .ok_or(ProtocolError::MissingField("entry[0].changes[0]"))?;
        let field = change
            .get("field")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingField("entry[0].changes[0].field"))?
            .to_owned();

        // Only these changes share the `metadata` + arrays shape.
        let value: ChangeValue = match field.as_str() {
            "messages" | "calls" => {
                let value = change
                    .get("value")
                    .cloned()
                    .ok_or(ProtocolError::MissingField("entry[0].changes[0].value"))?;
                serde_json::from_value(value).map_err(ProtocolError::from)?
            }
            other => {
                return Err(
                    ProtocolError::UnexpectedPayload(format!("unknown field `{other}`")).into(),
                )
            }
        };
        let raw = Arc::new(raw);
        let phone_id = value.metadata.phone_number_id;

        match field.as_str() {
            "messages" => {
                if let Some(message) = value.messages.and_then(|m| m.into_iter().next()) {
                    let contact = value.contacts.and_then(|c| c.into_iter().next());
                    let from = contact
                        .as_ref()
                        .map(|c| c.wa_id.clone())
                        .unwrap_or_else(|| message.from.clone());
                    let name = contact.and_then(|c| c.profile).and_then(|p| p.name);
                    debug!("incoming {} message from {}", message.kind, from);
                    return Ok(WebhookEvent::IncomingMessage(IncomingMessage {
                        phone_id,
                        from,
                        name,
                        message,
                        raw,
                        client: self.client.clone(),
                    }));
                }
                if let Some(status) = value.statuses.and_then(|s| s.into_iter().next()) {
                    return Ok(WebhookEvent::StatusUpdate(StatusUpdate {
                        phone_id,
                        recipient: status.recipient_id,
                        status: status.status,
                        id: status.id,
                        timestamp: status.timestamp,
                        conversation: status.conversation,
                        pricing: status.pricing,
                        error: status.errors.and_then(|e| e.into_iter().next()),
                        biz_opaque_callback_data: status.biz_opaque_callback_data,
                        raw,
                    }));
                }
                Err(ProtocolError::UnexpectedPayload(
                    "messages change without messages or statuses".into(),
                )
                .into())
            }
            // calls
            _ => {
                if let Some(call) = value.calls.and_then(|c| c.into_iter().next()) {
                    let from = call.from.clone();
                    return match call.event.as_str() {
                        "connect" => Ok(WebhookEvent::CallConnect(CallConnect {
                            phone_id,
                            from,
                            call,
                            raw,
                            client: self.client.clone(),
                        })),
                        "terminate" => Ok(WebhookEvent::CallTerminate(CallTerminate {
                            phone_id,
                            from,
                            call,
                            raw,
                        })),
                        other => Err(ProtocolError::UnexpectedPayload(format!(
                            "unknown call event `{other}`"
                        ))
                        .into()),
                    };
                }
                if let Some(status) = value.statuses.and_then(|s| s.into_iter().next()) {
                    return Ok(WebhookEvent::CallStatus(CallStatus {
                        phone_id,
                        recipient: status.recipient_id,
                        status: status.status,
                        id: status.id,
                        timestamp: status.timestamp,
                        raw,
                    }));
                }
                Err(ProtocolError::UnexpectedPayload(
                    "calls change without calls or statuses".into(),
                )
                .into())
            }
        }
    }
}
