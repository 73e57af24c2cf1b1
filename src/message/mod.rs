//! Outbound message builders.
//!
//! Every constructor validates the documented platform limits eagerly, so a
//! value that exists is always a valid wire object. `build` is pure and may
//! be called any number of times.

mod contacts;
mod interactive;
mod media;
mod section;
mod template;
mod text;
mod values;

pub use contacts::{
    Address, Birthday, ContactField, ContactPart, Contacts, Email, Multiplicity, Name,
    Organization, Phone, Url,
};
pub use interactive::{
    ButtonsAction, CatalogAction, CtaAction, FlowAction, FlowMode, FlowTarget, Header,
    HeaderRule, Interactive, InteractiveAction, ListAction, LocationRequestAction,
    ProductAction, ProductListAction,
};
pub use media::{Audio, Document, Image, MediaSource, Sticker, Video};
pub use section::{require_titles, LimitedList, Section};
pub use template::{
    BodyComponent, BodyParameter, ButtonComponent, CarouselCard, CarouselComponent,
    HeaderComponent, HeaderParameter, Template, TemplateComponent,
};
pub use text::{Location, Reaction, Text};
pub use values::{Button, Currency, DateTime, Language, Product, Row};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Character and count limits enforced by the platform.
pub mod limits {
    pub const TEXT_BODY: usize = 4096;
    pub const MEDIA_CAPTION: usize = 1024;
    pub const INTERACTIVE_BODY: usize = 1024;
    pub const INTERACTIVE_FOOTER: usize = 60;
    pub const HEADER_TEXT: usize = 60;
    pub const BUTTON_TITLE: usize = 20;
    pub const BUTTON_ID: usize = 256;
    pub const LIST_BUTTON: usize = 20;
    pub const ROW_ID: usize = 200;
    pub const ROW_TITLE: usize = 24;
    pub const ROW_DESCRIPTION: usize = 72;
    pub const SECTION_TITLE: usize = 24;
    pub const LIST_SECTIONS: usize = 10;
    pub const LIST_ROWS: usize = 10;
    pub const PRODUCT_SECTIONS: usize = 10;
    pub const SECTION_PRODUCTS: usize = 30;
    pub const REPLY_BUTTONS: usize = 3;
    pub const CTA_DISPLAY_TEXT: usize = 20;
    pub const FLOW_CTA: usize = 20;
    pub const CAROUSEL_CARDS: usize = 10;
    pub const MULTI_PRODUCT_SECTIONS: usize = 10;
    pub const COUPON_CODE: usize = 15;
    /// Bytes, since a single emoji may span many scalar values.
    pub const REACTION_EMOJI_BYTES: usize = 64;
    pub const BIZ_OPAQUE_CALLBACK_DATA: usize = 512;
}

/// Fail when `value` is longer than `max` characters.
pub(crate) fn check_len(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

/// Fail when `value` is empty or longer than `max` characters.
pub(crate) fn check_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    check_len(field, value, max)
}

pub(crate) fn check_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

/// Discriminant of every message kind the platform accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Audio,
    Document,
    Image,
    Sticker,
    Video,
    Location,
    Contacts,
    Interactive,
    Template,
    Reaction,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Audio => "audio",
            MessageType::Document => "document",
            MessageType::Image => "image",
            MessageType::Sticker => "sticker",
            MessageType::Video => "video",
            MessageType::Location => "location",
            MessageType::Contacts => "contacts",
            MessageType::Interactive => "interactive",
            MessageType::Template => "template",
            MessageType::Reaction => "reaction",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any message that can be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(Text),
    Audio(Audio),
    Document(Document),
    Image(Image),
    Sticker(Sticker),
    Video(Video),
    Location(Location),
    Contacts(Contacts),
    Interactive(Interactive),
    Template(Template),
    Reaction(Reaction),
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Text(_) => MessageType::Text,
            Message::Audio(_) => MessageType::Audio,
            Message::Document(_) => MessageType::Document,
            Message::Image(_) => MessageType::Image,
            Message::Sticker(_) => MessageType::Sticker,
            Message::Video(_) => MessageType::Video,
            Message::Location(_) => MessageType::Location,
            Message::Contacts(_) => MessageType::Contacts,
            Message::Interactive(_) => MessageType::Interactive,
            Message::Template(_) => MessageType::Template,
            Message::Reaction(_) => MessageType::Reaction,
        }
    }

    /// Wire payload placed under the message type key of the envelope.
    pub fn build(&self) -> Value {
        match self {
            Message::Text(m) => m.build(),
            Message::Audio(m) => m.build(),
            Message::Document(m) => m.build(),
            Message::Image(m) => m.build(),
            Message::Sticker(m) => m.build(),
            Message::Video(m) => m.build(),
            Message::Location(m) => m.build(),
            Message::Contacts(m) => m.build(),
            Message::Interactive(m) => m.build(),
            Message::Template(m) => m.build(),
            Message::Reaction(m) => m.build(),
        }
    }
}

macro_rules! impl_from_message {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Message {
                fn from(value: $variant) -> Self {
                    Message::$variant(value)
                }
            }
        )*
    };
}

impl_from_message!(
    Text,
    Audio,
    Document,
    Image,
    Sticker,
    Video,
    Location,
    Contacts,
    Interactive,
    Template,
    Reaction,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len_boundaries() {
        assert!(check_len("body", &"a".repeat(10), 10).is_ok());
        assert_eq!(
            check_len("body", &"a".repeat(11), 10),
            Err(ValidationError::TooLong {
                field: "body",
                max: 10,
                actual: 11
            })
        );
    }

    #[test]
    fn test_check_len_counts_chars() {
        // 4 chars, 8 bytes
        assert!(check_len("title", "ñañá", 4).is_ok());
    }

    #[test]
    fn test_message_type_tags() {
        let text: Message = Text::new("hi").unwrap().into();
        assert_eq!(text.message_type(), MessageType::Text);
        assert_eq!(text.message_type().to_string(), "text");
        assert_eq!(
            serde_json::to_value(MessageType::Interactive).unwrap(),
            Value::String("interactive".into())
        );
    }
}
