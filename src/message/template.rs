//! Pre-approved template messages.
//!
//! Button components don't know their position when constructed. The
//! template hands each of them the next free index while building and gets
//! the following one back, so positions stay contiguous even for
//! [`ButtonComponent::Skip`], which takes an index without emitting anything.
//! Carousel cards are numbered the same way with their own accumulator.

use serde_json::{json, Value};

use super::section::{require_titles, LimitedList, Section};
use super::values::{Currency, DateTime, Language, Product};
use super::{check_non_empty, check_text, limits, Location, MediaSource};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderParameter {
    Text(String),
    Currency(Currency),
    DateTime(DateTime),
    Image(MediaSource),
    Video(MediaSource),
    Document(MediaSource),
    Location(Location),
    Product { catalog_id: String, product: Product },
}

impl HeaderParameter {
    pub fn text(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        check_text("template header text", &text, limits::HEADER_TEXT)?;
        Ok(HeaderParameter::Text(text))
    }

    pub fn product(
        catalog_id: impl Into<String>,
        product: Product,
    ) -> Result<Self, ValidationError> {
        let catalog_id = catalog_id.into();
        check_non_empty("catalog_id", &catalog_id)?;
        Ok(HeaderParameter::Product {
            catalog_id,
            product,
        })
    }

    fn is_image_or_video(&self) -> bool {
        matches!(self, HeaderParameter::Image(_) | HeaderParameter::Video(_))
    }

    pub fn build(&self) -> Value {
        match self {
            HeaderParameter::Text(text) => json!({ "type": "text", "text": text }),
            HeaderParameter::Currency(currency) => {
                json!({ "type": "currency", "currency": currency.build() })
            }
            HeaderParameter::DateTime(date_time) => {
                json!({ "type": "date_time", "date_time": date_time.build() })
            }
            HeaderParameter::Image(source) => json!({ "type": "image", "image": source.build() }),
            HeaderParameter::Video(source) => json!({ "type": "video", "video": source.build() }),
            HeaderParameter::Document(source) => {
                json!({ "type": "document", "document": source.build() })
            }
            HeaderParameter::Location(location) => {
                json!({ "type": "location", "location": location.build() })
            }
            HeaderParameter::Product {
                catalog_id,
                product,
            } => json!({
                "type": "product",
                "product": {
                    "product_retailer_id": product.retailer_id(),
                    "catalog_id": catalog_id,
                },
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderComponent {
    parameters: Vec<HeaderParameter>,
}

impl HeaderComponent {
    pub fn new(parameters: Vec<HeaderParameter>) -> Result<Self, ValidationError> {
        if parameters.is_empty() {
            return Err(ValidationError::TooFew {
                label: "Header parameters",
                min: 1,
                actual: 0,
            });
        }
        Ok(Self { parameters })
    }

    pub fn build(&self) -> Value {
        json!({
            "type": "header",
            "parameters": self.parameters.iter().map(HeaderParameter::build).collect::<Vec<_>>(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyParameter {
    Text(String),
    Currency(Currency),
    DateTime(DateTime),
}

impl BodyParameter {
    pub fn text(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        check_non_empty("template body text", &text)?;
        Ok(BodyParameter::Text(text))
    }

    pub fn build(&self) -> Value {
        match self {
            BodyParameter::Text(text) => json!({ "type": "text", "text": text }),
            BodyParameter::Currency(currency) => {
                json!({ "type": "currency", "currency": currency.build() })
            }
            BodyParameter::DateTime(date_time) => {
                json!({ "type": "date_time", "date_time": date_time.build() })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyComponent {
    parameters: Vec<BodyParameter>,
}

impl BodyComponent {
    pub fn new(parameters: Vec<BodyParameter>) -> Result<Self, ValidationError> {
        if parameters.is_empty() {
            return Err(ValidationError::TooFew {
                label: "Body parameters",
                min: 1,
                actual: 0,
            });
        }
        Ok(Self { parameters })
    }

    pub fn build(&self) -> Value {
        json!({
            "type": "body",
            "parameters": self.parameters.iter().map(BodyParameter::build).collect::<Vec<_>>(),
        })
    }
}

/// A template button parameter. Positions are assigned at build time.
#[derive(Debug, Clone, PartialEq)]
pub enum ButtonComponent {
    QuickReply(String),
    Url(String),
    CopyCode(String),
    Flow {
        flow_token: Option<String>,
        flow_action_data: Option<Value>,
    },
    Catalog(Product),
    MultiProduct {
        thumbnail: Product,
        sections: LimitedList<Section<Product>>,
    },
    /// Placeholder for buttons without parameters (phone number, static URL).
    Skip,
}

impl ButtonComponent {
    pub fn quick_reply(payload: impl Into<String>) -> Result<Self, ValidationError> {
        let payload = payload.into();
        check_non_empty("quick_reply payload", &payload)?;
        Ok(ButtonComponent::QuickReply(payload))
    }

    /// Dynamic suffix appended to the template's URL.
    pub fn url(suffix: impl Into<String>) -> Result<Self, ValidationError> {
        let suffix = suffix.into();
        check_non_empty("url button text", &suffix)?;
        Ok(ButtonComponent::Url(suffix))
    }

    pub fn copy_code(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        check_text("coupon_code", &code, limits::COUPON_CODE)?;
        Ok(ButtonComponent::CopyCode(code))
    }

    pub fn flow(
        flow_token: Option<String>,
        flow_action_data: Option<Value>,
    ) -> Result<Self, ValidationError> {
        if let Some(data) = &flow_action_data {
            if !data.is_object() {
                return Err(ValidationError::Invalid {
                    field: "flow_action_data",
                    reason: "must be a JSON object".into(),
                });
            }
        }
        Ok(ButtonComponent::Flow {
            flow_token,
            flow_action_data,
        })
    }

    pub fn catalog(thumbnail: Product) -> Self {
        ButtonComponent::Catalog(thumbnail)
    }

    pub fn multi_product(
        thumbnail: Product,
        sections: Vec<Section<Product>>,
    ) -> Result<Self, ValidationError> {
        let sections = LimitedList::with_bounds(
            "Multi-product sections",
            sections,
            1,
            limits::MULTI_PRODUCT_SECTIONS,
        )?;
        require_titles("mpm", sections.items())?;
        Ok(ButtonComponent::MultiProduct {
            thumbnail,
            sections,
        })
    }

    pub fn skip() -> Self {
        ButtonComponent::Skip
    }

    pub fn sub_type(&self) -> Option<&'static str> {
        match self {
            ButtonComponent::QuickReply(_) => Some("quick_reply"),
            ButtonComponent::Url(_) => Some("url"),
            ButtonComponent::CopyCode(_) => Some("copy_code"),
            ButtonComponent::Flow { .. } => Some("flow"),
            ButtonComponent::Catalog(_) => Some("catalog"),
            ButtonComponent::MultiProduct { .. } => Some("mpm"),
            ButtonComponent::Skip => None,
        }
    }

    fn parameter(&self) -> Option<Value> {
        let parameter = match self {
            ButtonComponent::QuickReply(payload) => {
                json!({ "type": "payload", "payload": payload })
            }
            ButtonComponent::Url(text) => json!({ "type": "text", "text": text }),
            ButtonComponent::CopyCode(code) => {
                json!({ "type": "coupon_code", "coupon_code": code })
            }
            ButtonComponent::Flow {
                flow_token,
                flow_action_data,
            } => {
                let mut action = json!({});
                if let Some(token) = flow_token {
                    action["flow_token"] = json!(token);
                }
                if let Some(data) = flow_action_data {
                    action["flow_action_data"] = data.clone();
                }
                json!({ "type": "action", "action": action })
            }
            ButtonComponent::Catalog(thumbnail) => json!({
                "type": "action",
                "action": { "thumbnail_product_retailer_id": thumbnail.retailer_id() },
            }),
            ButtonComponent::MultiProduct {
                thumbnail,
                sections,
            } => json!({
                "type": "action",
                "action": {
                    "thumbnail_product_retailer_id": thumbnail.retailer_id(),
                    "sections": sections
                        .iter()
                        .map(|s| s.build_with("product_items", Product::build))
                        .collect::<Vec<_>>(),
                },
            }),
            ButtonComponent::Skip => return None,
        };
        Some(parameter)
    }

    /// Build at position `index`; returns the emitted object, if any, and
    /// the next free position.
    pub fn build(&self, index: usize) -> (Option<Value>, usize) {
        let value = self.sub_type().zip(self.parameter()).map(|(sub_type, parameter)| {
            json!({
                "type": "button",
                "sub_type": sub_type,
                "index": index,
                "parameters": [parameter],
            })
        });
        (value, index + 1)
    }
}

/// Fold button components from position 0, dropping skipped ones.
fn build_buttons<'a, I>(buttons: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a ButtonComponent>,
{
    buttons
        .into_iter()
        .fold((Vec::new(), 0), |(mut built, index), button| {
            let (value, next) = button.build(index);
            built.extend(value);
            (built, next)
        })
        .0
}

/// One card of a media carousel.
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselCard {
    header: HeaderParameter,
    body: Option<BodyComponent>,
    buttons: Vec<ButtonComponent>,
}

impl CarouselCard {
    /// Cards always start with an image or video header.
    pub fn new(
        header: HeaderParameter,
        body: Option<BodyComponent>,
        buttons: Vec<ButtonComponent>,
    ) -> Result<Self, ValidationError> {
        if !header.is_image_or_video() {
            return Err(ValidationError::Invalid {
                field: "carousel card header",
                reason: "must be an image or video".into(),
            });
        }
        Ok(Self {
            header,
            body,
            buttons,
        })
    }

    pub fn build(&self, card_index: usize) -> (Value, usize) {
        let mut components = vec![json!({ "type": "header", "parameters": [self.header.build()] })];
        if let Some(body) = &self.body {
            components.push(body.build());
        }
        components.extend(build_buttons(&self.buttons));
        (
            json!({ "card_index": card_index, "components": components }),
            card_index + 1,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselComponent {
    cards: LimitedList<CarouselCard>,
}

impl CarouselComponent {
    pub fn new(cards: Vec<CarouselCard>) -> Result<Self, ValidationError> {
        let cards = LimitedList::with_bounds("Carousel cards", cards, 1, limits::CAROUSEL_CARDS)?;
        Ok(Self { cards })
    }

    pub fn build(&self) -> Value {
        let (cards, _) = self
            .cards
            .iter()
            .fold((Vec::new(), 0), |(mut cards, card_index), card| {
                let (value, next) = card.build(card_index);
                cards.push(value);
                (cards, next)
            });
        json!({ "type": "carousel", "cards": cards })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateComponent {
    Header(HeaderComponent),
    Body(BodyComponent),
    Button(ButtonComponent),
    Carousel(CarouselComponent),
}

impl TemplateComponent {
    /// Build with `index` as the next free button position.
    pub fn build(&self, index: usize) -> (Option<Value>, usize) {
        match self {
            TemplateComponent::Header(header) => (Some(header.build()), index),
            TemplateComponent::Body(body) => (Some(body.build()), index),
            TemplateComponent::Button(button) => button.build(index),
            TemplateComponent::Carousel(carousel) => (Some(carousel.build()), index),
        }
    }
}

impl From<HeaderComponent> for TemplateComponent {
    fn from(value: HeaderComponent) -> Self {
        TemplateComponent::Header(value)
    }
}

impl From<BodyComponent> for TemplateComponent {
    fn from(value: BodyComponent) -> Self {
        TemplateComponent::Body(value)
    }
}

impl From<ButtonComponent> for TemplateComponent {
    fn from(value: ButtonComponent) -> Self {
        TemplateComponent::Button(value)
    }
}

impl From<CarouselComponent> for TemplateComponent {
    fn from(value: CarouselComponent) -> Self {
        TemplateComponent::Carousel(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: String,
    language: Language,
    components: Vec<TemplateComponent>,
}

impl Template {
    pub fn new(
        name: impl Into<String>,
        language: Language,
        components: Vec<TemplateComponent>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        check_non_empty("template name", &name)?;

        let count = |pred: fn(&TemplateComponent) -> bool| {
            components.iter().filter(|c| pred(c)).count()
        };
        let unique: [(&'static str, usize); 3] = [
            ("Template headers", count(|c| matches!(c, TemplateComponent::Header(_)))),
            ("Template bodies", count(|c| matches!(c, TemplateComponent::Body(_)))),
            ("Template carousels", count(|c| matches!(c, TemplateComponent::Carousel(_)))),
        ];
        for (label, actual) in unique {
            if actual > 1 {
                return Err(ValidationError::TooMany {
                    label,
                    max: 1,
                    actual,
                });
            }
        }

        Ok(Self {
            name,
            language,
            components,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build(&self) -> Value {
        let (components, _) =
            self.components
                .iter()
                .fold((Vec::new(), 0), |(mut built, index), component| {
                    let (value, next) = component.build(index);
                    built.extend(value);
                    (built, next)
                });

        let mut template = json!({ "name": self.name, "language": self.language.build() });
        if !components.is_empty() {
            template["components"] = Value::Array(components);
        }
        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() -> Language {
        Language::new("en_US").unwrap()
    }

    fn image() -> HeaderParameter {
        HeaderParameter::Image(MediaSource::link("https://example.com/a.jpg"))
    }

    #[test]
    fn test_button_indices_with_skip() {
        let template = Template::new(
            "order_update",
            english(),
            vec![
                ButtonComponent::quick_reply("yes").unwrap().into(),
                ButtonComponent::skip().into(),
                ButtonComponent::url("orders/42").unwrap().into(),
            ],
        )
        .unwrap();

        let built = template.build();
        let components = built["components"].as_array().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0]["index"], json!(0));
        assert_eq!(components[0]["sub_type"], json!("quick_reply"));
        assert_eq!(components[1]["index"], json!(2));
        assert_eq!(
            components[1]["parameters"],
            json!([{"type": "text", "text": "orders/42"}])
        );
    }

    #[test]
    fn test_skip_consumes_index() {
        assert_eq!(ButtonComponent::skip().build(1), (None, 2));
        let (value, next) = ButtonComponent::copy_code("SAVE10").unwrap().build(4);
        assert_eq!(next, 5);
        assert_eq!(
            value.unwrap()["parameters"],
            json!([{"type": "coupon_code", "coupon_code": "SAVE10"}])
        );
    }

    #[test]
    fn test_header_and_body_do_not_consume_indices() {
        let template = Template::new(
            "receipt",
            english(),
            vec![
                HeaderComponent::new(vec![HeaderParameter::text("Hi").unwrap()]).unwrap().into(),
                ButtonComponent::quick_reply("a").unwrap().into(),
                BodyComponent::new(vec![
                    BodyParameter::text("Ana").unwrap(),
                    BodyParameter::Currency(Currency::new(1000, "EUR", "1 €").unwrap()),
                ])
                .unwrap()
                .into(),
                ButtonComponent::quick_reply("b").unwrap().into(),
            ],
        )
        .unwrap();

        let built = template.build();
        let components = built["components"].as_array().unwrap();
        assert_eq!(components[0]["type"], json!("header"));
        assert_eq!(components[1]["index"], json!(0));
        assert_eq!(components[2]["parameters"][1]["currency"]["code"], json!("EUR"));
        assert_eq!(components[3]["index"], json!(1));
    }

    #[test]
    fn test_build_is_repeatable() {
        let template = Template::new(
            "t",
            english(),
            vec![
                ButtonComponent::quick_reply("a").unwrap().into(),
                ButtonComponent::quick_reply("b").unwrap().into(),
            ],
        )
        .unwrap();
        assert_eq!(template.build(), template.build());
    }

    #[test]
    fn test_template_without_components() {
        let template = Template::new("hello_world", english(), vec![]).unwrap();
        assert_eq!(
            template.build(),
            json!({"name": "hello_world", "language": {"code": "en_US", "policy": "deterministic"}})
        );
    }

    #[test]
    fn test_duplicate_body_fails() {
        let body = || -> TemplateComponent {
            BodyComponent::new(vec![BodyParameter::text("x").unwrap()]).unwrap().into()
        };
        assert!(matches!(
            Template::new("t", english(), vec![body(), body()]),
            Err(ValidationError::TooMany { label: "Template bodies", .. })
        ));
    }

    #[test]
    fn test_carousel_indices() {
        let card = || {
            CarouselCard::new(
                image(),
                None,
                vec![
                    ButtonComponent::skip(),
                    ButtonComponent::quick_reply("more").unwrap(),
                ],
            )
            .unwrap()
        };
        let carousel = CarouselComponent::new(vec![card(), card(), card()]).unwrap();
        let built = carousel.build();

        let cards = built["cards"].as_array().unwrap();
        for (i, card) in cards.iter().enumerate() {
            assert_eq!(card["card_index"], json!(i));
            let components = card["components"].as_array().unwrap();
            assert_eq!(components.len(), 2);
            assert_eq!(components[1]["index"], json!(1));
        }
    }

    #[test]
    fn test_carousel_limits() {
        let card = || CarouselCard::new(image(), None, vec![]).unwrap();
        assert!(CarouselComponent::new((0..10).map(|_| card()).collect()).is_ok());
        assert!(CarouselComponent::new((0..11).map(|_| card()).collect()).is_err());
        assert!(CarouselCard::new(HeaderParameter::text("x").unwrap(), None, vec![]).is_err());
        let video = HeaderParameter::Video(MediaSource::id("7"));
        assert!(CarouselCard::new(video, None, vec![]).is_ok());
    }

    #[test]
    fn test_carousel_rejects_document_header() {
        let document = HeaderParameter::Document(MediaSource::id("1"));
        match CarouselCard::new(document, None, vec![]) {
            Err(ValidationError::Invalid { field, reason }) => {
                assert_eq!(field, "carousel card header");
                assert_eq!(reason, "must be an image or video");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_coupon_code_limit() {
        assert!(ButtonComponent::copy_code("C".repeat(limits::COUPON_CODE)).is_ok());
        assert!(ButtonComponent::copy_code("C".repeat(limits::COUPON_CODE + 1)).is_err());
    }

    #[test]
    fn test_multi_product_button() {
        let section = |title: &str| {
            Section::new(
                "Multi-product items",
                Some(title.to_owned()),
                vec![Product::new("p1").unwrap()],
                limits::SECTION_PRODUCTS,
            )
            .unwrap()
        };
        let thumbnail = Product::new("thumb").unwrap();
        let button =
            ButtonComponent::multi_product(thumbnail, vec![section("A"), section("B")]).unwrap();
        let (value, _) = button.build(0);
        let value = value.unwrap();
        assert_eq!(value["sub_type"], json!("mpm"));
        assert_eq!(
            value["parameters"][0]["action"]["sections"][1],
            json!({"title": "B", "product_items": [{"product_retailer_id": "p1"}]})
        );

        let eleven = (0..11).map(|_| section("S")).collect();
        assert!(ButtonComponent::multi_product(Product::new("thumb").unwrap(), eleven).is_err());
    }
}
