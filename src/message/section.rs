//! Capped collections shared by every "list of sub-items" concept.

use serde_json::{Map, Value};

use super::{check_len, limits};
use crate::error::ValidationError;

/// An ordered sequence with a declared maximum length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitedList<T> {
    label: &'static str,
    items: Vec<T>,
}

impl<T> LimitedList<T> {
    /// Wrap `items`, failing when there are more than `max`.
    pub fn new(label: &'static str, items: Vec<T>, max: usize) -> Result<Self, ValidationError> {
        if items.len() > max {
            return Err(ValidationError::TooMany {
                label,
                max,
                actual: items.len(),
            });
        }
        Ok(Self { label, items })
    }

    /// Same as [`LimitedList::new`] with a lower bound as well.
    pub fn with_bounds(
        label: &'static str,
        items: Vec<T>,
        min: usize,
        max: usize,
    ) -> Result<Self, ValidationError> {
        if items.len() < min {
            return Err(ValidationError::TooFew {
                label,
                min,
                actual: items.len(),
            });
        }
        Self::new(label, items, max)
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a LimitedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A capped list of items with an optional short title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<T> {
    title: Option<String>,
    items: LimitedList<T>,
}

impl<T> Section<T> {
    /// Create a section holding between 1 and `max` items.
    pub fn new(
        label: &'static str,
        title: Option<String>,
        items: Vec<T>,
        max: usize,
    ) -> Result<Self, ValidationError> {
        if let Some(title) = &title {
            check_len("section title", title, limits::SECTION_TITLE)?;
        }
        let items = LimitedList::with_bounds(label, items, 1, max)?;
        Ok(Self { title, items })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn items(&self) -> &[T] {
        self.items.items()
    }

    /// Serialize as `{"title"?, <key>: [...]}` using `item` for each element.
    pub fn build_with<F>(&self, key: &str, item: F) -> Value
    where
        F: Fn(&T) -> Value,
    {
        let mut map = Map::new();
        if let Some(title) = &self.title {
            map.insert("title".into(), Value::String(title.clone()));
        }
        map.insert(
            key.into(),
            Value::Array(self.items.iter().map(item).collect()),
        );
        Value::Object(map)
    }
}

/// When more than one section is used, each of them needs a title.
pub fn require_titles<T>(
    label: &'static str,
    sections: &[Section<T>],
) -> Result<(), ValidationError> {
    if sections.len() > 1 && sections.iter().any(|s| s.title.is_none()) {
        return Err(ValidationError::MissingSectionTitle { label });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limited_list_cap() {
        assert!(LimitedList::new("Cards", vec![1, 2, 3], 3).is_ok());
        let err = LimitedList::new("Cards", vec![1, 2, 3, 4], 3).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooMany {
                label: "Cards",
                max: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn test_limited_list_lower_bound() {
        let err = LimitedList::<u8>::with_bounds("Buttons", vec![], 1, 3).unwrap_err();
        assert!(matches!(err, ValidationError::TooFew { min: 1, .. }));
    }

    #[test]
    fn test_section_title_limit() {
        let ok = "a".repeat(limits::SECTION_TITLE);
        assert!(Section::new("Rows", Some(ok), vec![1], 10).is_ok());

        let long = "a".repeat(limits::SECTION_TITLE + 1);
        assert!(Section::new("Rows", Some(long), vec![1], 10).is_err());
    }

    #[test]
    fn test_require_titles() {
        let untitled = Section::new("Rows", None, vec![1], 10).unwrap();
        let titled = Section::new("Rows", Some("x".into()), vec![2], 10).unwrap();

        assert!(require_titles("List", &[untitled.clone()]).is_ok());
        assert!(require_titles("List", &[untitled, titled.clone()]).is_err());
        assert!(require_titles("List", &[titled.clone(), titled]).is_ok());
    }

    #[test]
    fn test_build_with() {
        let section = Section::new("Rows", Some("Menu".into()), vec![1, 2], 10).unwrap();
        let built = section.build_with("rows", |n| Value::from(*n));
        assert_eq!(built, serde_json::json!({"title": "Menu", "rows": [1, 2]}));
    }
}
