//! Form data values
//!
//! A filled-in template form is a mapping from field name to
//! [`FieldValue`]. The mapping is ordered and structurally comparable,
//! which is what the live-preview scheduler relies on for change
//! detection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user-entered form value
///
/// Serialized untagged, so drafts round-trip as plain JSON scalars and
/// string arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicitly cleared value (JSON `null` in a stored draft)
    Null,
    /// Checkbox state
    Flag(bool),
    /// Numeric value
    Number(f64),
    /// Free-form text (also email/url/select values)
    Text(String),
    /// Repeated string values (skills, links, ...)
    List(Vec<String>),
}

impl FieldValue {
    /// Whether this value counts as "not provided" for required checks
    ///
    /// Text is empty after trimming, lists are empty when they have no
    /// entries. Flags and numbers are always considered provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Flag(_) | Self::Number(_) => false,
        }
    }

    /// View this value as text, if it is text
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Ordered field-name → value mapping for a whole form
pub type FormData = BTreeMap<String, FieldValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(FieldValue::Text("   ".to_string()).is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::Text("x".to_string()).is_empty());
        assert!(!FieldValue::Flag(false).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_untagged_round_trip() {
        let mut data = FormData::new();
        data.insert("name".to_string(), "Ada".into());
        data.insert("newsletter".to_string(), true.into());
        data.insert("years".to_string(), 7.0.into());
        data.insert(
            "skills".to_string(),
            vec!["rust".to_string(), "sql".to_string()].into(),
        );

        let json = serde_json::to_string(&data).unwrap();
        let back: FormData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
