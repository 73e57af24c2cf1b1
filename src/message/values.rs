//! Leaf values used inside interactive and template messages.

use serde_json::{json, Value};

use super::{check_len, check_non_empty, check_text, limits};
use crate::error::ValidationError;

/// Localized amount used by template parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    amount_1000: i64,
    code: String,
    fallback_value: String,
}

impl Currency {
    /// `amount_1000` is the amount multiplied by 1000; `code` is ISO 4217.
    pub fn new(
        amount_1000: i64,
        code: impl Into<String>,
        fallback_value: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let code = code.into();
        let fallback_value = fallback_value.into();
        if amount_1000 <= 0 {
            return Err(ValidationError::Invalid {
                field: "currency amount_1000",
                reason: "must be greater than 0".into(),
            });
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::Invalid {
                field: "currency code",
                reason: format!("`{code}` is not an ISO 4217 code"),
            });
        }
        check_non_empty("currency fallback_value", &fallback_value)?;
        Ok(Self {
            amount_1000,
            code,
            fallback_value,
        })
    }

    pub fn build(&self) -> Value {
        json!({
            "fallback_value": self.fallback_value,
            "code": self.code,
            "amount_1000": self.amount_1000,
        })
    }
}

/// Date/time template parameter, rendered by the platform from its fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTime {
    fallback_value: String,
}

impl DateTime {
    pub fn new(fallback_value: impl Into<String>) -> Result<Self, ValidationError> {
        let fallback_value = fallback_value.into();
        check_non_empty("date_time fallback_value", &fallback_value)?;
        Ok(Self { fallback_value })
    }

    pub fn build(&self) -> Value {
        json!({ "fallback_value": self.fallback_value })
    }
}

/// Quick reply button of a buttons action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    id: String,
    title: String,
}

impl Button {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let title = title.into();
        check_text("button id", &id, limits::BUTTON_ID)?;
        check_text("button title", &title, limits::BUTTON_TITLE)?;
        Ok(Self { id, title })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn build(&self) -> Value {
        json!({
            "type": "reply",
            "reply": { "id": self.id, "title": self.title },
        })
    }
}

/// Selectable row of a list section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: String,
    title: String,
    description: Option<String>,
}

impl Row {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let title = title.into();
        check_text("row id", &id, limits::ROW_ID)?;
        check_text("row title", &title, limits::ROW_TITLE)?;
        Ok(Self {
            id,
            title,
            description: None,
        })
    }

    pub fn with_description(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let description = description.into();
        check_len("row description", &description, limits::ROW_DESCRIPTION)?;
        let mut row = Self::new(id, title)?;
        row.description = Some(description);
        Ok(row)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn build(&self) -> Value {
        let mut row = json!({ "id": self.id, "title": self.title });
        if let Some(description) = &self.description {
            row["description"] = Value::String(description.clone());
        }
        row
    }
}

/// Catalog item referenced by its retailer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    product_retailer_id: String,
}

impl Product {
    pub fn new(product_retailer_id: impl Into<String>) -> Result<Self, ValidationError> {
        let product_retailer_id = product_retailer_id.into();
        check_non_empty("product_retailer_id", &product_retailer_id)?;
        Ok(Self {
            product_retailer_id,
        })
    }

    pub fn retailer_id(&self) -> &str {
        &self.product_retailer_id
    }

    pub fn build(&self) -> Value {
        json!({ "product_retailer_id": self.product_retailer_id })
    }
}

/// Template language. The platform only supports the deterministic policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    code: String,
}

impl Language {
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        check_non_empty("language code", &code)?;
        Ok(Self { code })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn build(&self) -> Value {
        json!({ "code": self.code, "policy": "deterministic" })
    }
}
