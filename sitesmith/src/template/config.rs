//! Template config parsing and normalization

use crate::error::ConfigError;
use crate::form::{FieldValue, FormData};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Kind of form field a template can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text input (default)
    #[default]
    Text,
    /// Email address
    Email,
    /// Absolute URL
    Url,
    /// Numeric value
    Number,
    /// Multi-line text
    Textarea,
    /// One of a fixed set of options
    Select,
    /// Boolean toggle
    Checkbox,
    /// Repeated string values
    Array,
}

impl FieldKind {
    /// Get the config-file name of this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Url => "url",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Array => "array",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Constraint rules a field can attach under `validation`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationRules {
    /// Minimum length (characters for text, entries for arrays)
    pub min_length: Option<usize>,
    /// Maximum length (characters for text, entries for arrays)
    pub max_length: Option<usize>,
    /// Custom regex the value must match
    pub pattern: Option<String>,
    /// Message shown when `pattern` does not match
    pub pattern_message: Option<String>,
    /// Lower bound for numeric fields
    pub min: Option<f64>,
    /// Upper bound for numeric fields
    pub max: Option<f64>,
}

/// A single form field declared by a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Field name, also the placeholder key in template files
    pub name: String,

    /// Human-readable label
    #[serde(default)]
    pub label: Option<String>,

    /// Field kind
    #[serde(rename = "type", default)]
    pub kind: FieldKind,

    /// Whether a value must be provided
    #[serde(default)]
    pub required: bool,

    /// Pre-filled default value
    #[serde(default)]
    pub default: Option<FieldValue>,

    /// Constraint rules
    #[serde(default)]
    pub validation: Option<ValidationRules>,

    /// Options for select fields
    #[serde(default)]
    pub options: Option<Vec<String>>,

    /// Entry cap for array fields
    #[serde(default)]
    pub max_items: Option<usize>,
}

impl FieldSpec {
    /// Label shown to the user, falling back to the field name
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// One step of the personalization form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Step identifier
    pub id: String,
    /// Step title
    pub title: String,
    /// Ordered fields within the step
    pub fields: Vec<FieldSpec>,
}

impl Step {
    fn normalize(raw: &Value, index: usize) -> Result<Self, ConfigError> {
        let id = match raw.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => (index + 1).to_string(),
        };

        let title = raw
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map_or_else(|| format!("Step {}", index + 1), str::to_string);

        let fields = match raw.get("fields") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|f| {
                    serde_json::from_value(f.clone()).map_err(|e| {
                        ConfigError::Malformed(format!("field in step {}: {e}", index + 1))
                    })
                })
                .collect::<Result<Vec<FieldSpec>, _>>()?,
            _ => Vec::new(),
        };

        Ok(Self { id, title, fields })
    }
}

/// The whole multi-step form a template declares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Ordered form steps
    pub steps: Vec<Step>,
}

/// Where the collected form data lands in the rendered site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataMapping {
    /// Output path of the data document, relative to the site root
    pub output_path: String,
    /// Serialization format of the data document
    pub format: String,
}

impl Default for DataMapping {
    fn default() -> Self {
        Self {
            output_path: "data.json".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Canonical, normalized template configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Template display name
    pub name: Option<String>,
    /// The personalization form
    pub form: FormConfig,
    /// Data document mapping
    pub data_mapping: DataMapping,
}

impl TemplateConfig {
    /// Normalize a raw `template.config.json` document
    ///
    /// Missing step `id`/`title` are filled positionally (`index + 1`,
    /// `"Step {n}"`), missing `fields` become an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSteps`] when the document has no
    /// `formConfig.steps` array, and [`ConfigError::Malformed`] when a
    /// field entry cannot be interpreted.
    pub fn parse(raw: &Value) -> Result<Self, ConfigError> {
        let steps_raw = raw
            .get("formConfig")
            .and_then(|fc| fc.get("steps"))
            .and_then(Value::as_array)
            .ok_or(ConfigError::MissingSteps)?;

        let steps = steps_raw
            .iter()
            .enumerate()
            .map(|(index, step)| Step::normalize(step, index))
            .collect::<Result<Vec<_>, _>>()?;

        let data_mapping = match raw.get("dataMapping") {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ConfigError::Malformed(format!("dataMapping: {e}")))?,
            None => DataMapping::default(),
        };

        let name = raw.get("name").and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            name,
            form: FormConfig { steps },
            data_mapping,
        })
    }

    /// Built-in single-step config used when a template ships no
    /// `template.config.json`
    ///
    /// A template without explicit config should still be usable with a
    /// minimal name/email form.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            name: None,
            form: FormConfig {
                steps: vec![Step {
                    id: "1".to_string(),
                    title: "Basic Information".to_string(),
                    fields: vec![
                        FieldSpec {
                            name: "name".to_string(),
                            label: Some("Name".to_string()),
                            kind: FieldKind::Text,
                            required: true,
                            default: None,
                            validation: None,
                            options: None,
                            max_items: None,
                        },
                        FieldSpec {
                            name: "email".to_string(),
                            label: Some("Email".to_string()),
                            kind: FieldKind::Email,
                            required: true,
                            default: None,
                            validation: None,
                            options: None,
                            max_items: None,
                        },
                    ],
                }],
            },
            data_mapping: DataMapping::default(),
        }
    }

    /// Collect every field's declared default value
    ///
    /// The first occurrence of a field name wins; explicit nulls are
    /// skipped.
    #[must_use]
    pub fn default_values(&self) -> FormData {
        let mut defaults = FormData::new();
        for field in self.fields() {
            if let Some(default) = &field.default {
                if *default != FieldValue::Null {
                    defaults
                        .entry(field.name.clone())
                        .or_insert_with(|| default.clone());
                }
            }
        }
        defaults
    }

    /// Merge user-entered data over the declared defaults
    ///
    /// User data always wins on key collision.
    #[must_use]
    pub fn merge_with_defaults(&self, user_data: &FormData) -> FormData {
        let mut merged = self.default_values();
        for (name, value) in user_data {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }

    /// Look up a field spec by name (first match wins)
    #[must_use]
    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().find(|f| f.name == name)
    }

    /// The validation schema: every field spec keyed by name
    ///
    /// The first occurrence of a duplicated name wins, matching
    /// [`Self::field_spec`].
    #[must_use]
    pub fn schema(&self) -> BTreeMap<&str, &FieldSpec> {
        let mut schema = BTreeMap::new();
        for field in self.fields() {
            schema.entry(field.name.as_str()).or_insert(field);
        }
        schema
    }

    /// Every field name, in step order
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields().map(|f| f.name.clone()).collect()
    }

    /// Whether a field's current value differs from its default
    ///
    /// A field without a default counts as modified once it holds a
    /// non-empty value.
    #[must_use]
    pub fn is_modified(&self, name: &str, current: Option<&FieldValue>) -> bool {
        match self.default_values().get(name) {
            None => current.is_some_and(|v| !v.is_empty()),
            Some(default) => current != Some(default),
        }
    }

    fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.form.steps.iter().flat_map(|step| step.fields.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_raw() -> Value {
        json!({
            "name": "Minimal Portfolio",
            "formConfig": {
                "steps": [
                    {
                        "title": "About You",
                        "fields": [
                            { "name": "name", "label": "Name", "type": "text",
                              "required": true, "default": "Ada" },
                            { "name": "bio", "type": "textarea" }
                        ]
                    },
                    {
                        "id": 7,
                        "fields": [
                            { "name": "skills", "type": "array",
                              "default": ["rust"] }
                        ]
                    },
                    {}
                ]
            },
            "dataMapping": { "outputPath": "content/data.json", "format": "json" }
        })
    }

    #[test]
    fn test_parse_normalizes_steps() {
        let config = TemplateConfig::parse(&sample_raw()).unwrap();

        assert_eq!(config.form.steps.len(), 3);
        assert_eq!(config.form.steps[0].id, "1");
        assert_eq!(config.form.steps[0].title, "About You");
        assert_eq!(config.form.steps[1].id, "7");
        assert_eq!(config.form.steps[1].title, "Step 2");
        assert_eq!(config.form.steps[2].id, "3");
        assert_eq!(config.form.steps[2].title, "Step 3");
        assert!(config.form.steps[2].fields.is_empty());
        assert_eq!(config.data_mapping.output_path, "content/data.json");
    }

    #[test]
    fn test_parse_rejects_missing_steps() {
        let err = TemplateConfig::parse(&json!({ "formConfig": {} })).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSteps));

        let err = TemplateConfig::parse(&json!({})).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSteps));
    }

    #[test]
    fn test_parse_defaults_data_mapping() {
        let config =
            TemplateConfig::parse(&json!({ "formConfig": { "steps": [] } })).unwrap();
        assert_eq!(config.data_mapping, DataMapping::default());
    }

    #[test]
    fn test_default_values_first_occurrence_wins() {
        let raw = json!({
            "formConfig": {
                "steps": [
                    { "fields": [ { "name": "name", "default": "first" } ] },
                    { "fields": [ { "name": "name", "default": "second" } ] }
                ]
            }
        });
        let config = TemplateConfig::parse(&raw).unwrap();
        let defaults = config.default_values();
        assert_eq!(defaults.get("name"), Some(&FieldValue::Text("first".into())));
    }

    #[test]
    fn test_default_values_skip_null() {
        let raw = json!({
            "formConfig": {
                "steps": [ { "fields": [ { "name": "avatar", "default": null } ] } ]
            }
        });
        let config = TemplateConfig::parse(&raw).unwrap();
        assert!(config.default_values().is_empty());
    }

    #[test]
    fn test_merge_with_defaults_user_wins() {
        let config = TemplateConfig::parse(&sample_raw()).unwrap();

        let mut user = FormData::new();
        user.insert("name".to_string(), "Grace".into());

        let merged = config.merge_with_defaults(&user);
        assert_eq!(merged.get("name"), Some(&FieldValue::Text("Grace".into())));
        assert_eq!(
            merged.get("skills"),
            Some(&FieldValue::List(vec!["rust".to_string()]))
        );
    }

    #[test]
    fn test_field_spec_lookup() {
        let config = TemplateConfig::parse(&sample_raw()).unwrap();
        assert_eq!(
            config.field_spec("bio").map(|f| f.kind),
            Some(FieldKind::Textarea)
        );
        assert!(config.field_spec("missing").is_none());
    }

    #[test]
    fn test_schema_keyed_by_name() {
        let config = TemplateConfig::parse(&sample_raw()).unwrap();
        let schema = config.schema();

        assert_eq!(schema.len(), 3);
        assert!(schema["name"].required);
        assert_eq!(schema["skills"].kind, FieldKind::Array);
    }

    #[test]
    fn test_is_modified() {
        let config = TemplateConfig::parse(&sample_raw()).unwrap();

        // has a default, differing value
        assert!(config.is_modified("name", Some(&"Grace".into())));
        assert!(!config.is_modified("name", Some(&"Ada".into())));
        // no default: empty value is unmodified, any content is
        assert!(!config.is_modified("bio", Some(&"".into())));
        assert!(!config.is_modified("bio", None));
        assert!(config.is_modified("bio", Some(&"hello".into())));
    }

    #[test]
    fn test_fallback_shape() {
        let config = TemplateConfig::fallback();
        assert_eq!(config.form.steps.len(), 1);
        assert_eq!(config.form.steps[0].title, "Basic Information");
        assert_eq!(config.field_names(), vec!["name", "email"]);
        assert!(config.field_spec("email").is_some_and(|f| f.required));
        assert_eq!(config.data_mapping.output_path, "data.json");
    }
}
