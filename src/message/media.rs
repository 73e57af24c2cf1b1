//! Media messages referencing an uploaded media id or a public link.

use serde_json::{Map, Value};

use super::{check_len, check_non_empty, limits};
use crate::error::ValidationError;

/// Where the platform fetches the media from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Id returned by a previous media upload.
    Id(String),
    /// Public HTTPS link.
    Link(String),
}

impl MediaSource {
    pub fn id(id: impl Into<String>) -> Self {
        MediaSource::Id(id.into())
    }

    pub fn link(link: impl Into<String>) -> Self {
        MediaSource::Link(link.into())
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match self {
            MediaSource::Id(id) => check_non_empty("media id", id),
            MediaSource::Link(link) => check_non_empty("media link", link),
        }
    }

    /// `{"id"}` or `{"link"}`.
    pub fn build(&self) -> Value {
        let mut map = Map::new();
        self.build_into(&mut map);
        Value::Object(map)
    }

    fn build_into(&self, map: &mut Map<String, Value>) {
        match self {
            MediaSource::Id(id) => map.insert("id".into(), Value::String(id.clone())),
            MediaSource::Link(link) => map.insert("link".into(), Value::String(link.clone())),
        };
    }
}

fn check_caption(caption: &Option<String>) -> Result<(), ValidationError> {
    match caption {
        Some(caption) => check_len("media caption", caption, limits::MEDIA_CAPTION),
        None => Ok(()),
    }
}

fn build_media(source: &MediaSource, extra: &[(&str, &Option<String>)]) -> Value {
    let mut map = Map::new();
    source.build_into(&mut map);
    for (key, value) in extra {
        if let Some(value) = value {
            map.insert((*key).into(), Value::String(value.clone()));
        }
    }
    Value::Object(map)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audio {
    source: MediaSource,
}

impl Audio {
    pub fn new(source: MediaSource) -> Result<Self, ValidationError> {
        source.validate()?;
        Ok(Self { source })
    }

    pub fn build(&self) -> Value {
        build_media(&self.source, &[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sticker {
    source: MediaSource,
}

impl Sticker {
    pub fn new(source: MediaSource) -> Result<Self, ValidationError> {
        source.validate()?;
        Ok(Self { source })
    }

    pub fn build(&self) -> Value {
        build_media(&self.source, &[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    source: MediaSource,
    caption: Option<String>,
}

impl Image {
    pub fn new(source: MediaSource, caption: Option<String>) -> Result<Self, ValidationError> {
        source.validate()?;
        check_caption(&caption)?;
        Ok(Self { source, caption })
    }

    pub fn build(&self) -> Value {
        build_media(&self.source, &[("caption", &self.caption)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    source: MediaSource,
    caption: Option<String>,
}

impl Video {
    pub fn new(source: MediaSource, caption: Option<String>) -> Result<Self, ValidationError> {
        source.validate()?;
        check_caption(&caption)?;
        Ok(Self { source, caption })
    }

    pub fn build(&self) -> Value {
        build_media(&self.source, &[("caption", &self.caption)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: MediaSource,
    caption: Option<String>,
    filename: Option<String>,
}

impl Document {
    pub fn new(
        source: MediaSource,
        caption: Option<String>,
        filename: Option<String>,
    ) -> Result<Self, ValidationError> {
        source.validate()?;
        check_caption(&caption)?;
        if let Some(filename) = &filename {
            check_non_empty("document filename", filename)?;
        }
        Ok(Self {
            source,
            caption,
            filename,
        })
    }

    pub fn build(&self) -> Value {
        build_media(
            &self.source,
            &[("caption", &self.caption), ("filename", &self.filename)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audio_by_id() {
        let audio = Audio::new(MediaSource::id("123")).unwrap();
        assert_eq!(audio.build(), json!({"id": "123"}));
    }

    #[test]
    fn test_document_fields() {
        let doc = Document::new(
            MediaSource::link("https://example.com/a.pdf"),
            Some("Invoice".into()),
            Some("a.pdf".into()),
        )
        .unwrap();
        assert_eq!(
            doc.build(),
            json!({"link": "https://example.com/a.pdf", "caption": "Invoice", "filename": "a.pdf"})
        );
    }

    #[test]
    fn test_caption_limit() {
        let ok = "c".repeat(limits::MEDIA_CAPTION);
        assert!(Image::new(MediaSource::id("1"), Some(ok)).is_ok());
        let long = "c".repeat(limits::MEDIA_CAPTION + 1);
        assert!(Video::new(MediaSource::id("1"), Some(long)).is_err());
    }

    #[test]
    fn test_empty_source() {
        assert!(Sticker::new(MediaSource::link("")).is_err());
    }
}
