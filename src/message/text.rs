use serde_json::{json, Value};

use super::{check_non_empty, check_text, limits};
use crate::error::ValidationError;

/// Plain text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    body: String,
    preview_url: bool,
}

impl Text {
    pub fn new(body: impl Into<String>) -> Result<Self, ValidationError> {
        let body = body.into();
        check_text("text body", &body, limits::TEXT_BODY)?;
        Ok(Self {
            body,
            preview_url: false,
        })
    }

    /// Text whose first URL is rendered as a link preview.
    pub fn with_preview(body: impl Into<String>) -> Result<Self, ValidationError> {
        let mut text = Self::new(body)?;
        text.preview_url = true;
        Ok(text)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn build(&self) -> Value {
        let mut value = json!({ "body": self.body });
        if self.preview_url {
            value["preview_url"] = Value::Bool(true);
        }
        value
    }
}

/// Static location pin.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    latitude: f64,
    longitude: f64,
    name: Option<String>,
    address: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::Invalid {
                field: "latitude",
                reason: format!("{latitude} is outside [-90, 90]"),
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::Invalid {
                field: "longitude",
                reason: format!("{longitude} is outside [-180, 180]"),
            });
        }
        Ok(Self {
            latitude,
            longitude,
            name: None,
            address: None,
        })
    }

    /// Pin with a place name and address shown under the map.
    pub fn named(
        latitude: f64,
        longitude: f64,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let mut location = Self::new(latitude, longitude)?;
        location.name = Some(name.into());
        location.address = Some(address.into());
        Ok(location)
    }

    pub fn build(&self) -> Value {
        let mut value = json!({
            "latitude": self.latitude,
            "longitude": self.longitude,
        });
        if let Some(name) = &self.name {
            value["name"] = Value::String(name.clone());
        }
        if let Some(address) = &self.address {
            value["address"] = Value::String(address.clone());
        }
        value
    }
}

/// Emoji reaction to a previous message. An empty emoji removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    message_id: String,
    emoji: String,
}

impl Reaction {
    pub fn new(
        message_id: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let message_id = message_id.into();
        let emoji = emoji.into();
        check_non_empty("reaction message_id", &message_id)?;
        if emoji.len() > limits::REACTION_EMOJI_BYTES {
            return Err(ValidationError::TooLong {
                field: "reaction emoji",
                max: limits::REACTION_EMOJI_BYTES,
                actual: emoji.len(),
            });
        }
        Ok(Self { message_id, emoji })
    }

    /// Reaction that clears the current one.
    pub fn remove(message_id: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(message_id, "")
    }

    pub fn build(&self) -> Value {
        json!({ "message_id": self.message_id, "emoji": self.emoji })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_body_limit() {
        assert!(Text::new("a".repeat(limits::TEXT_BODY)).is_ok());
        let err = Text::new("a".repeat(limits::TEXT_BODY + 1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "text body",
                max: 4096,
                actual: 4097
            }
        );
        assert!(Text::new("").is_err());
    }

    #[test]
    fn test_text_build_is_idempotent() {
        let text = Text::with_preview("see https://example.com").unwrap();
        let first = text.build();
        assert_eq!(first, text.build());
        assert_eq!(first["preview_url"], json!(true));
        assert!(Text::new("plain").unwrap().build().get("preview_url").is_none());
    }

    #[test]
    fn test_location_bounds() {
        assert!(Location::new(90.0, 180.0).is_ok());
        assert!(Location::new(90.1, 0.0).is_err());
        assert!(Location::new(0.0, -180.5).is_err());

        let place = Location::named(1.5, 2.5, "Office", "Main St 1").unwrap();
        assert_eq!(
            place.build(),
            json!({"latitude": 1.5, "longitude": 2.5, "name": "Office", "address": "Main St 1"})
        );
    }

    #[test]
    fn test_reaction() {
        let reaction = Reaction::new("wamid.1", "👍").unwrap();
        assert_eq!(reaction.build(), json!({"message_id": "wamid.1", "emoji": "👍"}));
        assert_eq!(Reaction::remove("wamid.1").unwrap().build()["emoji"], json!(""));
        assert!(Reaction::new("", "👍").is_err());
    }

    #[test]
    fn test_reaction_multi_scalar_emoji() {
        let kiss = "👩🏽\u{200d}❤\u{fe0f}\u{200d}💋\u{200d}👨🏻";
        assert!(kiss.chars().count() > 8);
        let reaction = Reaction::new("wamid.1", kiss).unwrap();
        assert_eq!(reaction.build()["emoji"], json!(kiss));

        assert!(Reaction::new("wamid.1", "👍".repeat(17)).is_err());
    }
}
