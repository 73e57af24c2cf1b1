//! Interactive messages: reply buttons, lists, catalogs, CTAs and flows.
//!
//! Which header an interactive message may carry depends on its action, so
//! the pairing is checked once in [`Interactive::new`] against a fixed table
//! (see [`InteractiveAction::header_rule`]).

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use super::section::{require_titles, LimitedList, Section};
use super::values::{Button, Product, Row};
use super::{check_len, check_non_empty, check_text, limits, MediaSource};
use crate::error::ValidationError;

/// Header shown above the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Text(String),
    Image(MediaSource),
    Video(MediaSource),
    Document(MediaSource),
}

impl Header {
    pub fn text(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        check_text("header text", &text, limits::HEADER_TEXT)?;
        Ok(Header::Text(text))
    }

    pub fn image(source: MediaSource) -> Result<Self, ValidationError> {
        source.validate()?;
        Ok(Header::Image(source))
    }

    pub fn video(source: MediaSource) -> Result<Self, ValidationError> {
        source.validate()?;
        Ok(Header::Video(source))
    }

    pub fn document(source: MediaSource) -> Result<Self, ValidationError> {
        source.validate()?;
        Ok(Header::Document(source))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Header::Text(_) => "text",
            Header::Image(_) => "image",
            Header::Video(_) => "video",
            Header::Document(_) => "document",
        }
    }

    pub fn build(&self) -> Value {
        match self {
            Header::Text(text) => json!({ "type": "text", "text": text }),
            Header::Image(source) | Header::Video(source) | Header::Document(source) => {
                let mut map = Map::new();
                map.insert("type".into(), Value::String(self.kind().into()));
                map.insert(self.kind().into(), source.build());
                Value::Object(map)
            }
        }
    }
}

/// Headers an action accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRule {
    Any,
    TextOnly,
    Forbidden,
}

impl HeaderRule {
    pub fn allows(&self, header: Option<&Header>) -> bool {
        match (self, header) {
            (HeaderRule::Any, _) | (_, None) => true,
            (HeaderRule::TextOnly, Some(Header::Text(_))) => true,
            _ => false,
        }
    }

    fn requirement(&self) -> &'static str {
        match self {
            HeaderRule::Any => "any header",
            HeaderRule::TextOnly => "a header of type text or no header",
            HeaderRule::Forbidden => "no header",
        }
    }
}

/// Up to three quick reply buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonsAction {
    buttons: LimitedList<Button>,
}

impl ButtonsAction {
    pub fn new(buttons: Vec<Button>) -> Result<Self, ValidationError> {
        let buttons = LimitedList::with_bounds("Reply buttons", buttons, 1, limits::REPLY_BUTTONS)?;

        let mut ids = HashSet::new();
        let mut titles = HashSet::new();
        for button in &buttons {
            if !ids.insert(button.id()) {
                return Err(ValidationError::Duplicate {
                    label: "reply button ids",
                    value: button.id().into(),
                });
            }
            if !titles.insert(button.title()) {
                return Err(ValidationError::Duplicate {
                    label: "reply button titles",
                    value: button.title().into(),
                });
            }
        }

        Ok(Self { buttons })
    }

    pub fn build(&self) -> Value {
        json!({ "buttons": self.buttons.iter().map(Button::build).collect::<Vec<_>>() })
    }
}

/// Menu of selectable rows grouped in sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListAction {
    button: String,
    sections: LimitedList<Section<Row>>,
}

impl ListAction {
    /// A list section holding up to ten rows.
    pub fn section(title: Option<&str>, rows: Vec<Row>) -> Result<Section<Row>, ValidationError> {
        Section::new("List section rows", title.map(str::to_owned), rows, limits::LIST_ROWS)
    }

    pub fn new(
        button: impl Into<String>,
        sections: Vec<Section<Row>>,
    ) -> Result<Self, ValidationError> {
        let button = button.into();
        check_text("list button", &button, limits::LIST_BUTTON)?;
        let sections =
            LimitedList::with_bounds("List sections", sections, 1, limits::LIST_SECTIONS)?;
        require_titles("list", sections.items())?;

        let mut ids = HashSet::new();
        for row in sections.iter().flat_map(Section::items) {
            if !ids.insert(row.id()) {
                return Err(ValidationError::Duplicate {
                    label: "list row ids",
                    value: row.id().into(),
                });
            }
        }

        Ok(Self { button, sections })
    }

    pub fn build(&self) -> Value {
        json!({
            "button": self.button,
            "sections": self
                .sections
                .iter()
                .map(|s| s.build_with("rows", Row::build))
                .collect::<Vec<_>>(),
        })
    }
}

/// Opens the business catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogAction {
    thumbnail: Option<Product>,
}

impl CatalogAction {
    pub fn new(thumbnail: Option<Product>) -> Self {
        Self { thumbnail }
    }

    pub fn build(&self) -> Value {
        let mut action = json!({ "name": "catalog_message" });
        if let Some(thumbnail) = &self.thumbnail {
            action["parameters"] =
                json!({ "thumbnail_product_retailer_id": thumbnail.retailer_id() });
        }
        action
    }
}

/// A single catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductAction {
    catalog_id: String,
    product: Product,
}

impl ProductAction {
    pub fn new(catalog_id: impl Into<String>, product: Product) -> Result<Self, ValidationError> {
        let catalog_id = catalog_id.into();
        check_non_empty("catalog_id", &catalog_id)?;
        Ok(Self {
            catalog_id,
            product,
        })
    }

    pub fn build(&self) -> Value {
        json!({
            "catalog_id": self.catalog_id,
            "product_retailer_id": self.product.retailer_id(),
        })
    }
}

/// Several catalog products grouped in sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListAction {
    catalog_id: String,
    sections: LimitedList<Section<Product>>,
}

impl ProductListAction {
    /// A product section holding up to thirty products.
    pub fn section(
        title: Option<&str>,
        products: Vec<Product>,
    ) -> Result<Section<Product>, ValidationError> {
        Section::new(
            "Product section items",
            title.map(str::to_owned),
            products,
            limits::SECTION_PRODUCTS,
        )
    }

    pub fn new(
        catalog_id: impl Into<String>,
        sections: Vec<Section<Product>>,
    ) -> Result<Self, ValidationError> {
        let catalog_id = catalog_id.into();
        check_non_empty("catalog_id", &catalog_id)?;
        let sections =
            LimitedList::with_bounds("Product sections", sections, 1, limits::PRODUCT_SECTIONS)?;
        require_titles("product_list", sections.items())?;
        Ok(Self {
            catalog_id,
            sections,
        })
    }

    pub fn build(&self) -> Value {
        json!({
            "catalog_id": self.catalog_id,
            "sections": self
                .sections
                .iter()
                .map(|s| s.build_with("product_items", Product::build))
                .collect::<Vec<_>>(),
        })
    }
}

/// Button that opens a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtaAction {
    display_text: String,
    url: String,
}

impl CtaAction {
    pub fn new(
        display_text: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let display_text = display_text.into();
        let url = url.into();
        check_text("cta display_text", &display_text, limits::CTA_DISPLAY_TEXT)?;
        check_non_empty("cta url", &url)?;
        Ok(Self { display_text, url })
    }

    pub fn build(&self) -> Value {
        json!({
            "name": "cta_url",
            "parameters": { "display_text": self.display_text, "url": self.url },
        })
    }
}

/// How a flow is referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowTarget {
    Id(String),
    Name(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowMode {
    #[default]
    Published,
    Draft,
}

#[derive(Debug, Clone, PartialEq)]
enum FlowStep {
    Navigate { screen: String, data: Option<Value> },
    DataExchange,
}

/// Button that opens a WhatsApp Flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowAction {
    target: FlowTarget,
    flow_token: String,
    flow_cta: String,
    step: FlowStep,
    mode: FlowMode,
}

impl FlowAction {
    /// Flow opening directly on `screen`, optionally seeded with `data`.
    pub fn navigate(
        target: FlowTarget,
        flow_token: impl Into<String>,
        flow_cta: impl Into<String>,
        screen: impl Into<String>,
        data: Option<Value>,
    ) -> Result<Self, ValidationError> {
        let screen = screen.into();
        check_non_empty("flow screen", &screen)?;
        if let Some(data) = &data {
            if !data.is_object() {
                return Err(ValidationError::Invalid {
                    field: "flow data",
                    reason: "must be a JSON object".into(),
                });
            }
        }
        Self::build_action(
            target,
            flow_token.into(),
            flow_cta.into(),
            FlowStep::Navigate { screen, data },
        )
    }

    /// Flow whose first screen is fetched from the business endpoint.
    pub fn data_exchange(
        target: FlowTarget,
        flow_token: impl Into<String>,
        flow_cta: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build_action(target, flow_token.into(), flow_cta.into(), FlowStep::DataExchange)
    }

    fn build_action(
        target: FlowTarget,
        flow_token: String,
        flow_cta: String,
        step: FlowStep,
    ) -> Result<Self, ValidationError> {
        match &target {
            FlowTarget::Id(id) => check_non_empty("flow_id", id)?,
            FlowTarget::Name(name) => check_non_empty("flow_name", name)?,
        }
        check_non_empty("flow_token", &flow_token)?;
        check_text("flow_cta", &flow_cta, limits::FLOW_CTA)?;
        Ok(Self {
            target,
            flow_token,
            flow_cta,
            step,
            mode: FlowMode::Published,
        })
    }

    pub fn with_mode(mut self, mode: FlowMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(&self) -> Value {
        let mut parameters = json!({
            "flow_message_version": "3",
            "flow_token": self.flow_token,
            "flow_cta": self.flow_cta,
        });
        match &self.target {
            FlowTarget::Id(id) => parameters["flow_id"] = json!(id),
            FlowTarget::Name(name) => parameters["flow_name"] = json!(name),
        }
        match &self.step {
            FlowStep::Navigate { screen, data } => {
                parameters["flow_action"] = json!("navigate");
                let mut payload = json!({ "screen": screen });
                if let Some(data) = data {
                    payload["data"] = data.clone();
                }
                parameters["flow_action_payload"] = payload;
            }
            FlowStep::DataExchange => parameters["flow_action"] = json!("data_exchange"),
        }
        if self.mode == FlowMode::Draft {
            parameters["mode"] = json!("draft");
        }
        json!({ "name": "flow", "parameters": parameters })
    }
}

/// Asks the user to share their location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationRequestAction;

impl LocationRequestAction {
    pub fn build(&self) -> Value {
        json!({ "name": "send_location" })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractiveAction {
    Buttons(ButtonsAction),
    List(ListAction),
    Catalog(CatalogAction),
    Product(ProductAction),
    ProductList(ProductListAction),
    Cta(CtaAction),
    Flow(FlowAction),
    LocationRequest(LocationRequestAction),
}

impl InteractiveAction {
    /// Interactive `type` the action is sent under.
    pub fn kind(&self) -> &'static str {
        match self {
            InteractiveAction::Buttons(_) => "button",
            InteractiveAction::List(_) => "list",
            InteractiveAction::Catalog(_) => "catalog_message",
            InteractiveAction::Product(_) => "product",
            InteractiveAction::ProductList(_) => "product_list",
            InteractiveAction::Cta(_) => "cta_url",
            InteractiveAction::Flow(_) => "flow",
            InteractiveAction::LocationRequest(_) => "location_request_message",
        }
    }

    pub fn header_rule(&self) -> HeaderRule {
        match self {
            InteractiveAction::List(_)
            | InteractiveAction::ProductList(_)
            | InteractiveAction::Cta(_)
            | InteractiveAction::Flow(_) => HeaderRule::TextOnly,
            InteractiveAction::Product(_) => HeaderRule::Forbidden,
            _ => HeaderRule::Any,
        }
    }

    pub fn requires_body(&self) -> bool {
        !matches!(self, InteractiveAction::Product(_))
    }

    pub fn build(&self) -> Value {
        match self {
            InteractiveAction::Buttons(a) => a.build(),
            InteractiveAction::List(a) => a.build(),
            InteractiveAction::Catalog(a) => a.build(),
            InteractiveAction::Product(a) => a.build(),
            InteractiveAction::ProductList(a) => a.build(),
            InteractiveAction::Cta(a) => a.build(),
            InteractiveAction::Flow(a) => a.build(),
            InteractiveAction::LocationRequest(a) => a.build(),
        }
    }
}

macro_rules! impl_from_action {
    ($($variant:ident => $ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for InteractiveAction {
                fn from(value: $ty) -> Self {
                    InteractiveAction::$variant(value)
                }
            }
        )*
    };
}

impl_from_action!(
    Buttons => ButtonsAction,
    List => ListAction,
    Catalog => CatalogAction,
    Product => ProductAction,
    ProductList => ProductListAction,
    Cta => CtaAction,
    Flow => FlowAction,
    LocationRequest => LocationRequestAction,
);

/// Interactive message.
#[derive(Debug, Clone, PartialEq)]
pub struct Interactive {
    action: InteractiveAction,
    body: Option<String>,
    header: Option<Header>,
    footer: Option<String>,
}

impl Interactive {
    pub fn new(
        action: impl Into<InteractiveAction>,
        body: Option<String>,
        header: Option<Header>,
        footer: Option<String>,
    ) -> Result<Self, ValidationError> {
        let action = action.into();

        let rule = action.header_rule();
        if !rule.allows(header.as_ref()) {
            return Err(ValidationError::HeaderNotAllowed {
                action: action.kind(),
                required: rule.requirement(),
            });
        }

        match &body {
            Some(body) => check_text("interactive body", body, limits::INTERACTIVE_BODY)?,
            None if action.requires_body() => {
                return Err(ValidationError::MissingBody {
                    action: action.kind(),
                })
            }
            None => {}
        }

        if let Some(footer) = &footer {
            check_len("interactive footer", footer, limits::INTERACTIVE_FOOTER)?;
        }

        Ok(Self {
            action,
            body,
            header,
            footer,
        })
    }

    pub fn action(&self) -> &InteractiveAction {
        &self.action
    }

    pub fn build(&self) -> Value {
        let mut value = json!({ "type": self.action.kind() });
        if let Some(header) = &self.header {
            value["header"] = header.build();
        }
        if let Some(body) = &self.body {
            value["body"] = json!({ "text": body });
        }
        if let Some(footer) = &self.footer {
            value["footer"] = json!({ "text": footer });
        }
        value["action"] = self.action.build();
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> Option<String> {
        Some("Pick one".into())
    }

    fn list() -> ListAction {
        let rows = vec![Row::new("r1", "One").unwrap(), Row::new("r2", "Two").unwrap()];
        ListAction::new("Open", vec![ListAction::section(None, rows).unwrap()]).unwrap()
    }

    fn image_header() -> Header {
        Header::image(MediaSource::link("https://example.com/a.png")).unwrap()
    }

    #[test]
    fn test_buttons_unique_ids_and_titles() {
        let ok = ButtonsAction::new(vec![
            Button::new("a", "Yes").unwrap(),
            Button::new("b", "No").unwrap(),
        ]);
        assert!(ok.is_ok());

        let same_id = ButtonsAction::new(vec![
            Button::new("a", "Yes").unwrap(),
            Button::new("a", "No").unwrap(),
        ]);
        assert!(matches!(same_id, Err(ValidationError::Duplicate { .. })));

        let same_title = ButtonsAction::new(vec![
            Button::new("a", "Yes").unwrap(),
            Button::new("b", "Yes").unwrap(),
        ]);
        assert!(matches!(same_title, Err(ValidationError::Duplicate { .. })));
    }

    #[test]
    fn test_buttons_count() {
        let buttons = |n: usize| {
            (0..n)
                .map(|i| Button::new(format!("id{i}"), format!("Title {i}")).unwrap())
                .collect::<Vec<_>>()
        };
        assert!(ButtonsAction::new(buttons(0)).is_err());
        assert!(ButtonsAction::new(buttons(3)).is_ok());
        assert!(ButtonsAction::new(buttons(4)).is_err());
    }

    #[test]
    fn test_text_only_actions_reject_media_header() {
        let cta = CtaAction::new("Visit", "https://example.com").unwrap();
        let flow = FlowAction::data_exchange(FlowTarget::Id("1".into()), "tok", "Start").unwrap();
        let products = ProductListAction::new(
            "cat",
            vec![ProductListAction::section(None, vec![Product::new("p1").unwrap()]).unwrap()],
        )
        .unwrap();

        let actions: Vec<InteractiveAction> =
            vec![list().into(), cta.into(), flow.into(), products.into()];
        for action in actions {
            let kind = action.kind();
            let err =
                Interactive::new(action.clone(), body(), Some(image_header()), None).unwrap_err();
            assert_eq!(
                err,
                ValidationError::HeaderNotAllowed {
                    action: kind,
                    required: "a header of type text or no header"
                }
            );
            let text_header = Some(Header::text("Hi").unwrap());
            assert!(Interactive::new(action.clone(), body(), text_header, None).is_ok());
            assert!(Interactive::new(action, body(), None, None).is_ok());
        }
    }

    #[test]
    fn test_product_rules() {
        let product = ProductAction::new("cat", Product::new("p1").unwrap()).unwrap();
        assert!(Interactive::new(product.clone(), None, None, None).is_ok());
        let text_header = Some(Header::text("Hi").unwrap());
        let err = Interactive::new(product, body(), text_header, None).unwrap_err();
        assert!(matches!(err, ValidationError::HeaderNotAllowed { action: "product", .. }));
    }

    #[test]
    fn test_body_required() {
        let err = Interactive::new(list(), None, None, None).unwrap_err();
        assert_eq!(err, ValidationError::MissingBody { action: "list" });
    }

    #[test]
    fn test_body_and_footer_limits() {
        let at_limit = "b".repeat(limits::INTERACTIVE_BODY);
        assert!(Interactive::new(list(), Some(at_limit), None, None).is_ok());
        let over = "b".repeat(limits::INTERACTIVE_BODY + 1);
        assert!(Interactive::new(list(), Some(over), None, None).is_err());

        let footer = "f".repeat(limits::INTERACTIVE_FOOTER);
        assert!(Interactive::new(list(), body(), None, Some(footer)).is_ok());
        let footer = "f".repeat(limits::INTERACTIVE_FOOTER + 1);
        assert!(Interactive::new(list(), body(), None, Some(footer)).is_err());

        assert!(Header::text("h".repeat(limits::HEADER_TEXT)).is_ok());
        assert!(Header::text("h".repeat(limits::HEADER_TEXT + 1)).is_err());
    }

    #[test]
    fn test_action_label_limits() {
        let sections = || {
            let rows = vec![Row::new("r1", "One").unwrap()];
            vec![ListAction::section(None, rows).unwrap()]
        };
        assert!(ListAction::new("a".repeat(limits::LIST_BUTTON), sections()).is_ok());
        assert!(ListAction::new("a".repeat(limits::LIST_BUTTON + 1), sections()).is_err());

        let url = "https://example.com";
        assert!(CtaAction::new("a".repeat(limits::CTA_DISPLAY_TEXT), url).is_ok());
        assert!(CtaAction::new("a".repeat(limits::CTA_DISPLAY_TEXT + 1), url).is_err());

        let flow = |cta: String| FlowAction::data_exchange(FlowTarget::Id("1".into()), "tok", cta);
        assert!(flow("a".repeat(limits::FLOW_CTA)).is_ok());
        assert!(matches!(
            flow("a".repeat(limits::FLOW_CTA + 1)),
            Err(ValidationError::TooLong { max: 20, actual: 21, .. })
        ));
    }

    #[test]
    fn test_list_sections() {
        let section = |title: Option<&str>, id: &str| {
            ListAction::section(title, vec![Row::new(id, "Row").unwrap()]).unwrap()
        };
        let untitled = vec![section(None, "a"), section(Some("B"), "b")];
        assert!(ListAction::new("Open", untitled).is_err());
        let titled = vec![section(Some("A"), "a"), section(Some("B"), "b")];
        assert!(ListAction::new("Open", titled).is_ok());
        let repeated_row = vec![section(Some("A"), "a"), section(Some("B"), "a")];
        assert!(ListAction::new("Open", repeated_row).is_err());

        let eleven = (0..11).map(|i| section(Some("S"), &format!("r{i}"))).collect();
        assert!(matches!(
            ListAction::new("Open", eleven),
            Err(ValidationError::TooMany { max: 10, actual: 11, .. })
        ));
    }

    #[test]
    fn test_product_section_cap() {
        let products = |n: usize| -> Vec<Product> {
            (0..n).map(|i| Product::new(format!("p{i}")).unwrap()).collect()
        };
        assert!(ProductListAction::section(None, products(30)).is_ok());
        assert!(ProductListAction::section(None, products(31)).is_err());
    }

    #[test]
    fn test_list_build() {
        let header = Some(Header::text("Menu").unwrap());
        let msg = Interactive::new(list(), body(), header, Some("Thanks".into())).unwrap();
        assert_eq!(
            msg.build(),
            json!({
                "type": "list",
                "header": {"type": "text", "text": "Menu"},
                "body": {"text": "Pick one"},
                "footer": {"text": "Thanks"},
                "action": {
                    "button": "Open",
                    "sections": [{"rows": [
                        {"id": "r1", "title": "One"},
                        {"id": "r2", "title": "Two"},
                    ]}],
                },
            })
        );
    }

    #[test]
    fn test_buttons_with_media_header() {
        let buttons = ButtonsAction::new(vec![Button::new("a", "Yes").unwrap()]).unwrap();
        let msg = Interactive::new(buttons, body(), Some(image_header()), None).unwrap();
        let built = msg.build();
        assert_eq!(built["type"], json!("button"));
        assert_eq!(
            built["header"],
            json!({"type": "image", "image": {"link": "https://example.com/a.png"}})
        );
        assert_eq!(built["action"]["buttons"][0]["reply"]["id"], json!("a"));
    }

    #[test]
    fn test_flow_build() {
        let flow = FlowAction::navigate(
            FlowTarget::Name("signup".into()),
            "tok-1",
            "Sign up",
            "WELCOME",
            Some(json!({"plan": "pro"})),
        )
        .unwrap()
        .with_mode(FlowMode::Draft);
        assert_eq!(
            flow.build(),
            json!({
                "name": "flow",
                "parameters": {
                    "flow_message_version": "3",
                    "flow_token": "tok-1",
                    "flow_cta": "Sign up",
                    "flow_name": "signup",
                    "flow_action": "navigate",
                    "flow_action_payload": {"screen": "WELCOME", "data": {"plan": "pro"}},
                    "mode": "draft",
                },
            })
        );
    }

    #[test]
    fn test_location_request_and_catalog() {
        let msg = Interactive::new(LocationRequestAction, body(), None, None).unwrap();
        assert_eq!(msg.build()["type"], json!("location_request_message"));
        assert_eq!(msg.build()["action"], json!({"name": "send_location"}));

        let catalog = CatalogAction::new(Some(Product::new("p9").unwrap()));
        assert_eq!(
            catalog.build(),
            json!({
                "name": "catalog_message",
                "parameters": {"thumbnail_product_retailer_id": "p9"},
            })
        );
    }
}
