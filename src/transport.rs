//! HTTP seam used for every outbound call.
//!
//! The crate only needs "send this JSON with these headers and give me the
//! JSON answer". [`UreqTransport`] is the default; tests and hosts with
//! their own HTTP stack implement [`Transport`] themselves.

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// A JSON request ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

pub trait Transport: Send + Sync {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Value, TransportError>>;
}

/// Blocking `ureq` agent driven from the tokio blocking pool.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(user_agent: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().user_agent(user_agent).build(),
        }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Value, TransportError>> {
        let agent = self.agent.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || send_blocking(&agent, request))
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?
        })
    }
}

fn send_blocking(agent: &ureq::Agent, request: Request) -> Result<Value, TransportError> {
    let mut call = agent.request(request.method.as_str(), &request.url);
    for (name, value) in &request.headers {
        call = call.set(name, value);
    }

    match call.send_json(request.body) {
        Ok(response) => response
            .into_json::<Value>()
            .map_err(|e| TransportError::Decode(e.to_string())),
        Err(ureq::Error::Status(status, response)) => Err(TransportError::Status {
            status,
            body: response
                .into_string()
                .unwrap_or_else(|_| "Unable to read response body".to_string()),
        }),
        Err(ureq::Error::Transport(transport)) => {
            Err(TransportError::Network(transport.to_string()))
        }
    }
}
