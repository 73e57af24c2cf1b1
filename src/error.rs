//! Error kinds surfaced by the crate.
//!
//! Callers branch on the kind rather than on message text: validation errors
//! come from message constructors, security errors from webhook
//! authentication, protocol errors from unrecognized inbound payloads and
//! transport errors from the HTTP collaborator.

use thiserror::Error;

/// A value failed one of its documented constraints at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} can't be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters long (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    #[error("{label} can't have more than {max} items (got {actual})")]
    TooMany {
        label: &'static str,
        max: usize,
        actual: usize,
    },
    #[error("{label} must have at least {min} items (got {actual})")]
    TooFew {
        label: &'static str,
        min: usize,
        actual: usize,
    },
    #[error("{label} contains the duplicated value `{value}`")]
    Duplicate { label: &'static str, value: String },
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("contact can't have more than one `{0}`")]
    DuplicateContactField(&'static str),
    #[error("contact must have exactly one `name`")]
    MissingContactName,
    #[error("all sections of {label} must have a title when there is more than one")]
    MissingSectionTitle { label: &'static str },
    #[error("interactive `{action}` requires {required}")]
    HeaderNotAllowed {
        action: &'static str,
        required: &'static str,
    },
    #[error("interactive `{action}` requires a body")]
    MissingBody { action: &'static str },
}

/// Webhook authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    #[error("app secret is not configured")]
    MissingAppSecret,
    #[error("verify token is not configured")]
    MissingVerifyToken,
    #[error("missing verification parameter `{0}`")]
    MissingParams(&'static str),
    #[error("verification token mismatch")]
    TokenMismatch,
    #[error("request raw body is missing")]
    MissingRawBody,
    #[error("x-hub-signature-256 header is missing")]
    MissingSignature,
    #[error("request signature verification failed")]
    InvalidSignature,
}

impl SecurityError {
    /// HTTP status code a host server should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            SecurityError::MissingAppSecret | SecurityError::MissingVerifyToken => 500,
            SecurityError::MissingParams(_) | SecurityError::MissingRawBody => 400,
            SecurityError::MissingSignature | SecurityError::InvalidSignature => 401,
            SecurityError::TokenMismatch => 403,
        }
    }
}

/// An inbound payload did not match any recognized shape.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload has no `object` field")]
    MissingObject,
    #[error("payload is missing `{0}`")]
    MissingField(&'static str),
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),
}

impl ProtocolError {
    /// Malformed notifications are always the sender's fault.
    pub fn status_code(&self) -> u16 {
        400
    }
}

/// Failure reported by the HTTP collaborator, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("server answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("network failure: {0}")]
    Network(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Umbrella error returned by the high-level API.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Security(#[from] SecurityError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    /// HTTP status code for errors raised while handling a webhook call.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Security(e) => e.status_code(),
            Error::Protocol(e) => e.status_code(),
            Error::Transport(TransportError::Status { status, .. }) => *status,
            Error::Transport(_) => 502,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_status_codes() {
        assert_eq!(SecurityError::MissingVerifyToken.status_code(), 500);
        assert_eq!(SecurityError::MissingParams("hub.mode").status_code(), 400);
        assert_eq!(SecurityError::TokenMismatch.status_code(), 403);
        assert_eq!(SecurityError::InvalidSignature.status_code(), 401);
    }

    #[test]
    fn test_too_many_message() {
        let err = ValidationError::TooMany {
            label: "Section",
            max: 10,
            actual: 11,
        };
        assert_eq!(err.to_string(), "Section can't have more than 10 items (got 11)");
    }

    #[test]
    fn test_umbrella_conversion() {
        let err: Error = SecurityError::MissingSignature.into();
        assert!(matches!(err, Error::Security(SecurityError::MissingSignature)));
        assert_eq!(err.status_code(), 401);
    }
}
