//! Contact cards.
//!
//! A contact is assembled from a flat list of parts. Some parts may appear
//! several times (phones, emails...) and are collected into arrays, others
//! may appear at most once. The multiplicity is a property of each part's
//! field, so the merge branches on it rather than on a fixed object shape.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::check_non_empty;
use crate::error::ValidationError;

/// Whether a contact field may be given more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    Repeatable,
    Unique,
}

/// Tag of a contact part; also the key it is stored under in the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Address,
    Email,
    Phone,
    Url,
    Name,
    Birthday,
    Organization,
}

impl ContactField {
    pub fn key(&self) -> &'static str {
        match self {
            ContactField::Address => "addresses",
            ContactField::Email => "emails",
            ContactField::Phone => "phones",
            ContactField::Url => "urls",
            ContactField::Name => "name",
            ContactField::Birthday => "birthday",
            ContactField::Organization => "org",
        }
    }

    pub fn multiplicity(&self) -> Multiplicity {
        match self {
            ContactField::Address
            | ContactField::Email
            | ContactField::Phone
            | ContactField::Url => Multiplicity::Repeatable,
            ContactField::Name | ContactField::Birthday | ContactField::Organization => {
                Multiplicity::Unique
            }
        }
    }
}

fn object(fields: &[(&str, Option<&String>)]) -> Value {
    let mut map = Map::new();
    for (key, value) in fields {
        if let Some(value) = value {
            map.insert((*key).into(), Value::String((*value).clone()));
        }
    }
    Value::Object(map)
}

fn at_least_one(field: &'static str, values: &[&Option<String>]) -> Result<(), ValidationError> {
    if values.iter().all(|v| v.as_deref().map_or(true, str::is_empty)) {
        return Err(ValidationError::Invalid {
            field,
            reason: "at least one field must be set".into(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    /// `HOME` or `WORK`.
    pub kind: Option<String>,
}

impl Address {
    pub fn build(&self) -> Value {
        object(&[
            ("street", self.street.as_ref()),
            ("city", self.city.as_ref()),
            ("state", self.state.as_ref()),
            ("zip", self.zip.as_ref()),
            ("country", self.country.as_ref()),
            ("country_code", self.country_code.as_ref()),
            ("type", self.kind.as_ref()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    email: String,
    kind: Option<String>,
}

impl Email {
    pub fn new(email: impl Into<String>, kind: Option<String>) -> Result<Self, ValidationError> {
        let email = email.into();
        check_non_empty("contact email", &email)?;
        Ok(Self { email, kind })
    }

    pub fn build(&self) -> Value {
        object(&[("email", Some(&self.email)), ("type", self.kind.as_ref())])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    phone: Option<String>,
    kind: Option<String>,
    wa_id: Option<String>,
}

impl Phone {
    /// Either `phone` or `wa_id` must be given.
    pub fn new(
        phone: Option<String>,
        kind: Option<String>,
        wa_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        at_least_one("contact phone", &[&phone, &wa_id])?;
        Ok(Self { phone, kind, wa_id })
    }

    pub fn number(phone: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Some(phone.into()), None, None)
    }

    pub fn build(&self) -> Value {
        object(&[
            ("phone", self.phone.as_ref()),
            ("type", self.kind.as_ref()),
            ("wa_id", self.wa_id.as_ref()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    url: String,
    kind: Option<String>,
}

impl Url {
    pub fn new(url: impl Into<String>, kind: Option<String>) -> Result<Self, ValidationError> {
        let url = url.into();
        check_non_empty("contact url", &url)?;
        Ok(Self { url, kind })
    }

    pub fn build(&self) -> Value {
        object(&[("url", Some(&self.url)), ("type", self.kind.as_ref())])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    formatted_name: String,
    first_name: Option<String>,
    last_name: Option<String>,
    middle_name: Option<String>,
    suffix: Option<String>,
    prefix: Option<String>,
}

impl Name {
    /// `formatted_name` plus at least one of first/last name.
    pub fn new(
        formatted_name: impl Into<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<Self, ValidationError> {
        let formatted_name = formatted_name.into();
        check_non_empty("contact formatted_name", &formatted_name)?;
        at_least_one("contact name", &[&first_name, &last_name])?;
        Ok(Self {
            formatted_name,
            first_name,
            last_name,
            middle_name: None,
            suffix: None,
            prefix: None,
        })
    }

    pub fn with_middle_name(mut self, middle_name: impl Into<String>) -> Self {
        self.middle_name = Some(middle_name.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn build(&self) -> Value {
        object(&[
            ("formatted_name", Some(&self.formatted_name)),
            ("first_name", self.first_name.as_ref()),
            ("last_name", self.last_name.as_ref()),
            ("middle_name", self.middle_name.as_ref()),
            ("suffix", self.suffix.as_ref()),
            ("prefix", self.prefix.as_ref()),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Birthday(NaiveDate);

impl Birthday {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn ymd(year: i32, month: u32, day: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| ValidationError::Invalid {
                field: "contact birthday",
                reason: format!("{year:04}-{month:02}-{day:02} is not a valid date"),
            })
    }

    pub fn build(&self) -> Value {
        Value::String(self.0.format("%Y-%m-%d").to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    company: Option<String>,
    department: Option<String>,
    title: Option<String>,
}

impl Organization {
    pub fn new(
        company: Option<String>,
        department: Option<String>,
        title: Option<String>,
    ) -> Result<Self, ValidationError> {
        at_least_one("contact org", &[&company, &department, &title])?;
        Ok(Self {
            company,
            department,
            title,
        })
    }

    pub fn build(&self) -> Value {
        object(&[
            ("company", self.company.as_ref()),
            ("department", self.department.as_ref()),
            ("title", self.title.as_ref()),
        ])
    }
}

/// One piece of a contact card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactPart {
    Address(Address),
    Email(Email),
    Phone(Phone),
    Url(Url),
    Name(Name),
    Birthday(Birthday),
    Organization(Organization),
}

impl ContactPart {
    pub fn field(&self) -> ContactField {
        match self {
            ContactPart::Address(_) => ContactField::Address,
            ContactPart::Email(_) => ContactField::Email,
            ContactPart::Phone(_) => ContactField::Phone,
            ContactPart::Url(_) => ContactField::Url,
            ContactPart::Name(_) => ContactField::Name,
            ContactPart::Birthday(_) => ContactField::Birthday,
            ContactPart::Organization(_) => ContactField::Organization,
        }
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.field().multiplicity()
    }

    pub fn build(&self) -> Value {
        match self {
            ContactPart::Address(p) => p.build(),
            ContactPart::Email(p) => p.build(),
            ContactPart::Phone(p) => p.build(),
            ContactPart::Url(p) => p.build(),
            ContactPart::Name(p) => p.build(),
            ContactPart::Birthday(p) => p.build(),
            ContactPart::Organization(p) => p.build(),
        }
    }
}

macro_rules! impl_from_part {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ContactPart {
                fn from(value: $variant) -> Self {
                    ContactPart::$variant(value)
                }
            }
        )*
    };
}

impl_from_part!(Address, Email, Phone, Url, Name, Birthday, Organization);

/// Fold one group of parts into a single contact card.
fn merge(parts: &[ContactPart]) -> Result<Map<String, Value>, ValidationError> {
    let mut contact = Map::new();

    for part in parts {
        let key = part.field().key();
        match part.multiplicity() {
            Multiplicity::Repeatable => {
                let entry = contact
                    .entry(key)
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(values) = entry {
                    values.push(part.build());
                }
            }
            Multiplicity::Unique => {
                if contact.contains_key(key) {
                    return Err(ValidationError::DuplicateContactField(key));
                }
                contact.insert(key.into(), part.build());
            }
        }
    }

    if !contact.contains_key(ContactField::Name.key()) {
        return Err(ValidationError::MissingContactName);
    }

    Ok(contact)
}

/// Contacts message: one card per group of parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Contacts {
    contacts: Vec<Map<String, Value>>,
}

impl Contacts {
    pub fn new(groups: Vec<Vec<ContactPart>>) -> Result<Self, ValidationError> {
        if groups.is_empty() {
            return Err(ValidationError::TooFew {
                label: "Contacts",
                min: 1,
                actual: 0,
            });
        }
        let contacts = groups
            .iter()
            .map(|group| merge(group))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { contacts })
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn build(&self) -> Value {
        Value::Array(self.contacts.iter().cloned().map(Value::Object).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name() -> ContactPart {
        Name::new("John Doe", Some("John".into()), Some("Doe".into()))
            .unwrap()
            .into()
    }

    #[test]
    fn test_single_contact_with_phones_keeps_order() {
        let contacts = Contacts::new(vec![vec![
            Phone::number("+1 111").unwrap().into(),
            name(),
            Phone::new(None, Some("WORK".into()), Some("1222".into())).unwrap().into(),
            Birthday::ymd(1990, 5, 17).unwrap().into(),
        ]])
        .unwrap();

        assert_eq!(
            contacts.build(),
            json!([{
                "phones": [
                    {"phone": "+1 111"},
                    {"type": "WORK", "wa_id": "1222"},
                ],
                "name": {"formatted_name": "John Doe", "first_name": "John", "last_name": "Doe"},
                "birthday": "1990-05-17",
            }])
        );
    }

    #[test]
    fn test_two_names_fail() {
        let err = Contacts::new(vec![vec![name(), name()]]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateContactField("name"));
    }

    #[test]
    fn test_missing_name_fails() {
        let err = Contacts::new(vec![vec![Phone::number("1").unwrap().into()]]).unwrap_err();
        assert_eq!(err, ValidationError::MissingContactName);
    }

    #[test]
    fn test_unique_org_and_repeatable_emails() {
        let org = || -> ContactPart {
            Organization::new(Some("ACME".into()), None, None).unwrap().into()
        };
        assert!(Contacts::new(vec![vec![name(), org(), org()]]).is_err());

        let contacts = Contacts::new(vec![
            vec![
                name(),
                Email::new("a@x.io", None).unwrap().into(),
                Email::new("b@x.io", Some("WORK".into())).unwrap().into(),
            ],
            vec![name(), org()],
        ])
        .unwrap();
        let built = contacts.build();
        assert_eq!(built[0]["emails"].as_array().unwrap().len(), 2);
        assert_eq!(built[1]["org"], json!({"company": "ACME"}));
    }

    #[test]
    fn test_part_validation() {
        assert!(Name::new("X", None, None).is_err());
        assert!(Phone::new(None, Some("HOME".into()), None).is_err());
        assert!(Birthday::ymd(2021, 2, 30).is_err());
        assert!(Contacts::new(vec![]).is_err());
    }

    #[test]
    fn test_field_multiplicity() {
        assert_eq!(ContactField::Phone.multiplicity(), Multiplicity::Repeatable);
        assert_eq!(ContactField::Organization.multiplicity(), Multiplicity::Unique);
        assert_eq!(ContactField::Organization.key(), "org");
    }
}
